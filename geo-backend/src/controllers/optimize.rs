use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::keywords::chat_service;
use super::storage_error;
use crate::content::ArticleOptimizer;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/optimize")
            .route(web::get().to(list_optimizations))
            .route(web::post().to(optimize)),
    );
}

#[derive(Deserialize)]
struct ListQuery {
    brand: Option<String>,
}

async fn list_optimizations(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    match state.storage.list_optimizations(query.brand.as_deref()) {
        Ok(optimizations) => HttpResponse::Ok().json(optimizations),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct OptimizeRequest {
    article_id: String,
    #[serde(default)]
    directives: Vec<String>,
    provider: Option<String>,
}

async fn optimize(state: web::Data<AppState>, body: web::Json<OptimizeRequest>) -> impl Responder {
    let article = match state.storage.get_article(&body.article_id) {
        Ok(Some(a)) => a,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Article not found: {}", body.article_id)
            }))
        }
        Err(e) => return storage_error(e),
    };

    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(Some(s)) => s,
        Ok(None) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Optimization requires a configured API key"
            }))
        }
        Err(resp) => return resp,
    };

    match ArticleOptimizer::new(service, state.storage.clone())
        .optimize(&article, &body.directives)
        .await
    {
        Ok(optimization) => HttpResponse::Ok().json(optimization),
        Err(e) => {
            log::error!("Optimization failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e }))
        }
    }
}
