use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::{resolve_brand, storage_error};
use crate::ai::{ChatService, ProviderId};
use crate::verify::BrandVerifier;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/verify")
            .route(web::get().to(list_results))
            .route(web::post().to(verify)),
    );
}

#[derive(Deserialize)]
struct ListQuery {
    brand: Option<String>,
}

async fn list_results(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    match state.storage.list_verify_results(query.brand.as_deref()) {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct VerifyRequest {
    brand: Option<String>,
    keyword: String,
    /// Restrict the check to these providers; otherwise every enabled key
    #[serde(default)]
    providers: Vec<String>,
}

async fn verify(state: web::Data<AppState>, body: web::Json<VerifyRequest>) -> impl Responder {
    if body.keyword.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "keyword must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let mut services = match ChatService::all_enabled(&state.storage) {
        Ok(s) => s,
        Err(e) => return storage_error(e),
    };
    if !body.providers.is_empty() {
        let requested: Vec<ProviderId> = match body
            .providers
            .iter()
            .map(|p| {
                ProviderId::from_str(p).ok_or_else(|| format!("Unknown provider: {}", p))
            })
            .collect::<Result<_, _>>()
        {
            Ok(ids) => ids,
            Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e })),
        };
        services.retain(|s| requested.contains(&s.provider()));
    }
    if services.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No enabled API keys for the requested providers"
        }));
    }

    match BrandVerifier::new(state.storage.clone())
        .verify(&services, &brand, body.keyword.trim())
        .await
    {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            log::error!("Verification failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e }))
        }
    }
}
