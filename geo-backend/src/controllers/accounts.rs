use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;

use super::storage_error;
use crate::models::{PlatformAccount, Platform, PublishRecord};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/accounts")
            .route(web::get().to(list_accounts))
            .route(web::post().to(save_account)),
    );
    cfg.service(web::resource("/api/accounts/{id}").route(web::delete().to(delete_account)));
    cfg.service(
        web::resource("/api/publish")
            .route(web::get().to(list_publish_records))
            .route(web::post().to(queue_publish)),
    );
}

async fn list_accounts(state: web::Data<AppState>) -> impl Responder {
    match state.storage.list_platform_accounts() {
        Ok(accounts) => HttpResponse::Ok().json(accounts),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct SaveAccountRequest {
    platform: String,
    username: String,
    credential: String,
    enabled: Option<bool>,
}

async fn save_account(
    state: web::Data<AppState>,
    body: web::Json<SaveAccountRequest>,
) -> impl Responder {
    if Platform::from_str(&body.platform).is_none() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unknown platform: {}", body.platform)
        }));
    }
    if body.username.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "username must not be empty"
        }));
    }

    let account = PlatformAccount {
        id: uuid::Uuid::new_v4().to_string(),
        platform: body.platform.to_lowercase(),
        username: body.username.trim().to_string(),
        credential: body.credential.clone(),
        enabled: body.enabled.unwrap_or(true),
        created_at: Utc::now(),
    };
    match state.storage.save_platform_account(&account) {
        Ok(()) => HttpResponse::Ok().json(account),
        Err(e) => storage_error(e),
    }
}

async fn delete_account(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.storage.delete_platform_account(&path) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "deleted": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Account not found: {}", path)
        })),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct ListPublishQuery {
    article_id: Option<String>,
}

async fn list_publish_records(
    state: web::Data<AppState>,
    query: web::Query<ListPublishQuery>,
) -> impl Responder {
    match state.storage.list_publish_records(query.article_id.as_deref()) {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct QueuePublishRequest {
    article_id: String,
    /// Defaults to the article's own platform
    platform: Option<String>,
}

/// Record-only publishing: the article is queued as "pending" and no
/// outbound call is made.
async fn queue_publish(
    state: web::Data<AppState>,
    body: web::Json<QueuePublishRequest>,
) -> impl Responder {
    let article = match state.storage.get_article(&body.article_id) {
        Ok(Some(a)) => a,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Article not found: {}", body.article_id)
            }))
        }
        Err(e) => return storage_error(e),
    };

    let platform = match &body.platform {
        Some(p) => match Platform::from_str(p) {
            Some(platform) => platform.as_str().to_string(),
            None => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Unknown platform: {}", p)
                }))
            }
        },
        None => article.platform.as_str().to_string(),
    };

    let record = PublishRecord::pending(&article.id, &platform);
    match state.storage.save_publish_record(&record) {
        Ok(()) => HttpResponse::Ok().json(record),
        Err(e) => storage_error(e),
    }
}
