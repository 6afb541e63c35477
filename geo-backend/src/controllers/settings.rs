use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use super::storage_error;
use crate::ai::ProviderId;
use crate::models::{ProviderKey, UpdateAppSettingsRequest, UpsertProviderKeyRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/settings")
            .route(web::get().to(get_settings))
            .route(web::put().to(update_settings)),
    );
    cfg.service(
        web::resource("/api/settings/providers")
            .route(web::get().to(list_provider_keys))
            .route(web::put().to(upsert_provider_key)),
    );
    cfg.service(
        web::resource("/api/settings/providers/{provider}")
            .route(web::delete().to(delete_provider_key)),
    );
    cfg.service(web::resource("/api/providers").route(web::get().to(list_providers)));
}

async fn get_settings(state: web::Data<AppState>) -> impl Responder {
    match state.storage.get_app_settings() {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => storage_error(e),
    }
}

async fn update_settings(
    state: web::Data<AppState>,
    body: web::Json<UpdateAppSettingsRequest>,
) -> impl Responder {
    if let Some(provider) = body.active_provider.as_deref() {
        if ProviderId::from_str(provider).is_none() {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Unknown provider: {}", provider)
            }));
        }
    }
    match state.storage.update_app_settings(&body) {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => storage_error(e),
    }
}

/// Provider key listing never returns the full key
#[derive(Serialize)]
struct MaskedProviderKey {
    id: i64,
    provider: String,
    api_key_preview: String,
    model: Option<String>,
    endpoint: Option<String>,
    enabled: bool,
}

fn mask(key: &ProviderKey) -> MaskedProviderKey {
    // Keys are user input and may contain multi-byte characters, so the
    // preview is built from chars rather than a byte slice
    let chars: Vec<char> = key.api_key.chars().collect();
    let preview = if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("...{}", tail)
    } else {
        "****".to_string()
    };
    MaskedProviderKey {
        id: key.id,
        provider: key.provider.clone(),
        api_key_preview: preview,
        model: key.model.clone(),
        endpoint: key.endpoint.clone(),
        enabled: key.enabled,
    }
}

async fn list_provider_keys(state: web::Data<AppState>) -> impl Responder {
    match state.storage.list_provider_keys() {
        Ok(keys) => HttpResponse::Ok().json(keys.iter().map(mask).collect::<Vec<_>>()),
        Err(e) => storage_error(e),
    }
}

async fn upsert_provider_key(
    state: web::Data<AppState>,
    body: web::Json<UpsertProviderKeyRequest>,
) -> impl Responder {
    let provider = match ProviderId::from_str(&body.provider) {
        Some(p) => p,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Unknown provider: {}", body.provider)
            }))
        }
    };
    if body.api_key.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "api_key must not be empty"
        }));
    }

    match state.storage.upsert_provider_key(
        provider.as_str(),
        body.api_key.trim(),
        body.model.as_deref(),
        body.endpoint.as_deref(),
        body.enabled.unwrap_or(true),
    ) {
        Ok(()) => match state.storage.get_provider_key(provider.as_str()) {
            Ok(Some(key)) => HttpResponse::Ok().json(mask(&key)),
            Ok(None) => storage_error("Saved key not found".to_string()),
            Err(e) => storage_error(e),
        },
        Err(e) => storage_error(e),
    }
}

async fn delete_provider_key(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match state.storage.delete_provider_key(&path) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No key for provider: {}", path)
        })),
        Err(e) => storage_error(e),
    }
}

/// Static catalog of supported chat providers
async fn list_providers() -> impl Responder {
    let providers: Vec<_> = ProviderId::all()
        .into_iter()
        .map(|p| {
            serde_json::json!({
                "id": p.as_str(),
                "name": p.display_name(),
                "endpoint": p.endpoint(),
                "default_model": p.default_model(),
            })
        })
        .collect();
    HttpResponse::Ok().json(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn key(api_key: &str) -> ProviderKey {
        ProviderKey {
            id: 1,
            provider: "deepseek".to_string(),
            api_key: api_key.to_string(),
            model: None,
            endpoint: None,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_mask_keeps_last_four_chars() {
        assert_eq!(mask(&key("sk-abcdef")).api_key_preview, "...cdef");
    }

    #[test]
    fn test_mask_short_keys_fully_hidden() {
        assert_eq!(mask(&key("abcd")).api_key_preview, "****");
        assert_eq!(mask(&key("")).api_key_preview, "****");
    }

    #[test]
    fn test_mask_multibyte_key() {
        assert_eq!(mask(&key("密钥密钥密钥")).api_key_preview, "...密钥密钥");
        assert_eq!(mask(&key("sk-密钥")).api_key_preview, "...k-密钥");
    }
}
