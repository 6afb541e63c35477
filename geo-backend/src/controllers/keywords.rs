use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use std::collections::HashMap;

use super::{resolve_brand, storage_error};
use crate::ai::{ChatService, ProviderId};
use crate::keywords::{
    generate_combinations, CombinationRequest, KeywordMining, SemanticExpander, TopicCluster,
    Wordbank,
};
use crate::models::{Keyword, KeywordSource};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/keywords")
            .route(web::get().to(list_keywords))
            .route(web::post().to(add_keyword)),
    );
    cfg.service(web::resource("/api/keywords/combine").route(web::post().to(combine)));
    cfg.service(web::resource("/api/keywords/expand").route(web::post().to(expand)));
    cfg.service(web::resource("/api/keywords/cluster").route(web::post().to(cluster)));
    cfg.service(web::resource("/api/keywords/mine").route(web::post().to(mine)));
}

#[derive(Deserialize)]
struct ListQuery {
    brand: Option<String>,
}

async fn list_keywords(state: web::Data<AppState>, query: web::Query<ListQuery>) -> impl Responder {
    match state.storage.list_keywords(query.brand.as_deref()) {
        Ok(keywords) => HttpResponse::Ok().json(keywords),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct AddKeywordRequest {
    brand: Option<String>,
    keyword: String,
    category: Option<String>,
    intent: Option<String>,
}

async fn add_keyword(
    state: web::Data<AppState>,
    body: web::Json<AddKeywordRequest>,
) -> impl Responder {
    if body.keyword.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "keyword must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let mut keyword = Keyword::new(&brand, body.keyword.trim(), KeywordSource::Manual);
    if let Some(category) = body.category.as_deref() {
        keyword = keyword.with_category(category);
    }
    if let Some(intent) = body.intent.as_deref() {
        keyword = keyword.with_intent(intent);
    }
    match state.storage.save_keyword(&keyword) {
        Ok(()) => HttpResponse::Ok().json(keyword),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct CombineRequest {
    brand: Option<String>,
    /// Extra term lists layered over the built-in bank for the brand
    #[serde(default)]
    categories: HashMap<String, Vec<String>>,
    pattern: Vec<String>,
    limit: Option<usize>,
    separator: Option<String>,
    #[serde(default)]
    save: bool,
}

async fn combine(state: web::Data<AppState>, body: web::Json<CombineRequest>) -> impl Responder {
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    if body.pattern.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "pattern must name at least one category"
        }));
    }

    let mut bank = Wordbank::default_bank(&brand);
    for (name, terms) in &body.categories {
        bank.add_category(name, terms.clone());
    }

    let combos = generate_combinations(
        &bank,
        &CombinationRequest {
            pattern: body.pattern.clone(),
            limit: body.limit,
            separator: body.separator.clone(),
        },
    );

    if body.save {
        let keywords: Vec<Keyword> = combos
            .iter()
            .map(|k| Keyword::new(&brand, k, KeywordSource::Combinator))
            .collect();
        if let Err(e) = state.storage.save_keywords(&keywords) {
            return storage_error(e);
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "brand": brand,
        "count": combos.len(),
        "keywords": combos,
        "saved": body.save,
    }))
}

#[derive(Deserialize)]
struct ExpandRequest {
    brand: Option<String>,
    seed: String,
    count: Option<usize>,
    provider: Option<String>,
    #[serde(default)]
    save: bool,
}

async fn expand(state: web::Data<AppState>, body: web::Json<ExpandRequest>) -> impl Responder {
    if body.seed.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "seed must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let result = SemanticExpander::new(service)
        .expand(body.seed.trim(), body.count.unwrap_or(10))
        .await;

    if body.save {
        let keywords: Vec<Keyword> = result
            .keywords
            .iter()
            .map(|k| Keyword::new(&brand, k, KeywordSource::Expansion))
            .collect();
        if let Err(e) = state.storage.save_keywords(&keywords) {
            return storage_error(e);
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "seed": body.seed.trim(),
        "source": result.source,
        "keywords": result.keywords,
        "saved": body.save,
    }))
}

#[derive(Deserialize)]
struct ClusterRequest {
    brand: Option<String>,
    /// Keywords to cluster; when absent, the brand's saved keywords are used
    keywords: Option<Vec<String>>,
    max_clusters: Option<usize>,
    provider: Option<String>,
}

async fn cluster(state: web::Data<AppState>, body: web::Json<ClusterRequest>) -> impl Responder {
    let keywords = match &body.keywords {
        Some(list) if !list.is_empty() => list.clone(),
        _ => {
            let brand = match resolve_brand(&state, body.brand.as_deref()) {
                Ok(b) => b,
                Err(resp) => return resp,
            };
            match state.storage.list_keywords(Some(&brand)) {
                Ok(saved) => saved.into_iter().map(|k| k.keyword).collect(),
                Err(e) => return storage_error(e),
            }
        }
    };
    if keywords.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No keywords to cluster"
        }));
    }

    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let result = TopicCluster::new(service)
        .cluster(&keywords, body.max_clusters.unwrap_or(5))
        .await;

    HttpResponse::Ok().json(result)
}

#[derive(Deserialize)]
struct MineRequest {
    brand: Option<String>,
    topic: String,
    count: Option<usize>,
    provider: Option<String>,
    #[serde(default)]
    save: bool,
}

async fn mine(state: web::Data<AppState>, body: web::Json<MineRequest>) -> impl Responder {
    if body.topic.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "topic must not be empty"
        }));
    }
    let brand = match resolve_brand(&state, body.brand.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let service = match chat_service(&state, body.provider.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let result = KeywordMining::new(service)
        .mine(body.topic.trim(), &brand, body.count.unwrap_or(10))
        .await;

    if body.save {
        let keywords: Vec<Keyword> = result
            .keywords
            .iter()
            .map(|m| Keyword::new(&brand, &m.keyword, KeywordSource::Mining).with_intent(&m.intent))
            .collect();
        if let Err(e) = state.storage.save_keywords(&keywords) {
            return storage_error(e);
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "topic": body.topic.trim(),
        "source": result.source,
        "keywords": result.keywords,
        "saved": body.save,
    }))
}

/// Optional chat service for endpoints with rule-based fallbacks
pub(crate) fn chat_service(
    state: &web::Data<AppState>,
    provider: Option<&str>,
) -> Result<Option<ChatService>, HttpResponse> {
    let provider_id = match provider {
        Some(p) => match ProviderId::from_str(p) {
            Some(id) => Some(id),
            None => {
                return Err(HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Unknown provider: {}", p)
                })))
            }
        },
        None => None,
    };
    ChatService::from_storage(&state.storage, provider_id).map_err(storage_error)
}
