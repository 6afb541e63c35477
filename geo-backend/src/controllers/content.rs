use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use std::sync::Arc;

use super::keywords::chat_service;
use super::{resolve_brand, storage_error};
use crate::content::{
    eeat, facts, metrics, ContentGenerator, ContentScorer, EeatEnhancer, FactDensityEnhancer,
    GenerateRequest,
};
use crate::models::Platform;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/content").route(web::get().to(list_articles)));
    cfg.service(web::resource("/api/content/generate").route(web::post().to(generate)));
    cfg.service(web::resource("/api/content/generate/batch").route(web::post().to(generate_batch)));
    cfg.service(web::resource("/api/content/jobs/{id}").route(web::get().to(job_status)));
    cfg.service(web::resource("/api/content/jobs/{id}/cancel").route(web::post().to(job_cancel)));
    cfg.service(web::resource("/api/content/score").route(web::post().to(score)));
    cfg.service(web::resource("/api/content/enhance/eeat").route(web::post().to(enhance_eeat)));
    cfg.service(web::resource("/api/content/enhance/facts").route(web::post().to(enhance_facts)));
    cfg.service(web::resource("/api/content/{id}").route(web::get().to(get_article)));
    cfg.service(web::resource("/api/content/{id}/metrics").route(web::get().to(article_metrics)));
}

#[derive(Deserialize)]
struct ListQuery {
    brand: Option<String>,
    keyword: Option<String>,
}

async fn list_articles(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    match state
        .storage
        .list_articles(query.brand.as_deref(), query.keyword.as_deref())
    {
        Ok(articles) => HttpResponse::Ok().json(articles),
        Err(e) => storage_error(e),
    }
}

async fn get_article(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.storage.get_article(&path) {
        Ok(Some(article)) => HttpResponse::Ok().json(article),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Article not found: {}", path)
        })),
        Err(e) => storage_error(e),
    }
}

/// Rule-based analysis bundle for one article: structural metrics, fact
/// density and E-E-A-T marker scores.
async fn article_metrics(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let article = match state.storage.get_article(&path) {
        Ok(Some(a)) => a,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Article not found: {}", path)
            }))
        }
        Err(e) => return storage_error(e),
    };

    HttpResponse::Ok().json(serde_json::json!({
        "article_id": article.id,
        "metrics": metrics::analyze(&article.content, &article.keyword),
        "fact_density": facts::fact_density(&article.content),
        "eeat": eeat::analyze(&article.content),
    }))
}

#[derive(Deserialize)]
struct GenerateBody {
    brand: Option<String>,
    keyword: String,
    platform: Option<Platform>,
    word_count: Option<usize>,
    provider: Option<String>,
}

async fn generate(state: web::Data<AppState>, body: web::Json<GenerateBody>) -> impl Responder {
    if body.keyword.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "keyword must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let platform = match default_platform(&state, body.platform) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(Some(s)) => s,
        Ok(None) => return no_api_key(),
        Err(resp) => return resp,
    };

    let generator = ContentGenerator::new(service, state.storage.clone(), &brand);
    match generator
        .generate(&GenerateRequest {
            keyword: body.keyword.trim().to_string(),
            platform,
            word_count: body.word_count,
        })
        .await
    {
        Ok(article) => HttpResponse::Ok().json(article),
        Err(e) => {
            log::error!("Generation failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e }))
        }
    }
}

#[derive(Deserialize)]
struct BatchBody {
    brand: Option<String>,
    keywords: Vec<String>,
    platform: Option<Platform>,
    word_count: Option<usize>,
    provider: Option<String>,
}

/// Kick off a background batch run and return its job id. Progress and the
/// produced article ids come from GET /api/content/jobs/{id}.
async fn generate_batch(state: web::Data<AppState>, body: web::Json<BatchBody>) -> impl Responder {
    let keywords: Vec<String> = body
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "keywords must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let platform = match default_platform(&state, body.platform) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(Some(s)) => s,
        Ok(None) => return no_api_key(),
        Err(resp) => return resp,
    };

    let job = state.jobs.create(keywords.len());
    let job_id = job.id.clone();
    let storage = Arc::clone(&state.storage);
    let word_count = body.word_count;

    tokio::spawn(async move {
        let generator = ContentGenerator::new(service, storage, &brand);
        generator
            .generate_batch(
                &keywords,
                platform,
                word_count,
                &job.token,
                |done, total, result| {
                    job.record(result);
                    log::info!("[GENERATE] Batch {}: {}/{}", job.id, done, total);
                },
            )
            .await;
        job.finish();
    });

    HttpResponse::Accepted().json(serde_json::json!({ "job_id": job_id }))
}

async fn job_status(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.jobs.get(&path) {
        Some(job) => HttpResponse::Ok().json(job.snapshot()),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Job not found: {}", path)
        })),
    }
}

async fn job_cancel(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    if state.jobs.cancel(&path) {
        HttpResponse::Ok().json(serde_json::json!({ "cancelled": true }))
    } else {
        HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Job not found: {}", path)
        }))
    }
}

#[derive(Deserialize)]
struct ScoreBody {
    brand: Option<String>,
    /// Either an existing article id or raw text plus its keyword
    article_id: Option<String>,
    text: Option<String>,
    keyword: Option<String>,
    provider: Option<String>,
}

async fn score(state: web::Data<AppState>, body: web::Json<ScoreBody>) -> impl Responder {
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let (text, keyword) = match (&body.article_id, &body.text, &body.keyword) {
        (Some(id), _, _) => match state.storage.get_article(id) {
            Ok(Some(article)) => (article.content.clone(), article.keyword.clone()),
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": format!("Article not found: {}", id)
                }))
            }
            Err(e) => return storage_error(e),
        },
        (None, Some(text), Some(keyword)) => (text.clone(), keyword.clone()),
        _ => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Provide article_id, or text together with keyword"
            }))
        }
    };

    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let score = ContentScorer::new(service).score(&text, &keyword, &brand).await;

    // Scoring an existing article writes the result back onto it
    if let Some(id) = &body.article_id {
        if let Err(e) = state
            .storage
            .update_article_score(id, score.overall, score.source)
        {
            log::warn!("Failed to record article score: {}", e);
        }
    }
    HttpResponse::Ok().json(score)
}

#[derive(Deserialize)]
struct EnhanceBody {
    text: String,
    keyword: Option<String>,
    provider: Option<String>,
}

async fn enhance_eeat(state: web::Data<AppState>, body: web::Json<EnhanceBody>) -> impl Responder {
    if body.text.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "text must not be empty"
        }));
    }
    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let enhancement = EeatEnhancer::new(service).enhance(&body.text).await;
    HttpResponse::Ok().json(enhancement)
}

async fn enhance_facts(state: web::Data<AppState>, body: web::Json<EnhanceBody>) -> impl Responder {
    if body.text.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "text must not be empty"
        }));
    }
    let keyword = body.keyword.clone().unwrap_or_default();
    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let enhancement = FactDensityEnhancer::new(service).enhance(&body.text, &keyword).await;
    HttpResponse::Ok().json(enhancement)
}

fn default_platform(
    state: &web::Data<AppState>,
    requested: Option<Platform>,
) -> Result<Platform, HttpResponse> {
    if let Some(platform) = requested {
        return Ok(platform);
    }
    match state.storage.get_app_settings() {
        Ok(settings) => Ok(Platform::from_str(&settings.default_platform).unwrap_or(Platform::Blog)),
        Err(e) => Err(storage_error(e)),
    }
}

fn no_api_key() -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": "No enabled API key for the requested provider"
    }))
}
