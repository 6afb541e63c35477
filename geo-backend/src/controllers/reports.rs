use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::storage_error;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/reports/costs").route(web::get().to(costs)));
    cfg.service(web::resource("/api/reports/calls").route(web::get().to(calls)));
    cfg.service(web::resource("/api/reports/scores").route(web::get().to(scores)));
    cfg.service(
        web::resource("/api/reports/verifications").route(web::get().to(verifications)),
    );
    cfg.service(web::resource("/api/reports/overview").route(web::get().to(overview)));
}

#[derive(Deserialize)]
struct CostQuery {
    /// RFC3339 lower bound, inclusive
    since: Option<String>,
    /// RFC3339 upper bound, inclusive
    until: Option<String>,
}

async fn costs(state: web::Data<AppState>, query: web::Query<CostQuery>) -> impl Responder {
    match state
        .storage
        .cost_summary(query.since.as_deref(), query.until.as_deref())
    {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct CallsQuery {
    limit: Option<usize>,
}

async fn calls(state: web::Data<AppState>, query: web::Query<CallsQuery>) -> impl Responder {
    match state.storage.list_api_calls(query.limit.unwrap_or(100)) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct ScoresQuery {
    brand: Option<String>,
    keyword: Option<String>,
}

/// Score history: scored articles oldest first, for charting over time
async fn scores(state: web::Data<AppState>, query: web::Query<ScoresQuery>) -> impl Responder {
    let articles = match state
        .storage
        .list_articles(query.brand.as_deref(), query.keyword.as_deref())
    {
        Ok(a) => a,
        Err(e) => return storage_error(e),
    };

    let mut points: Vec<_> = articles
        .iter()
        .filter_map(|a| {
            a.score.map(|score| {
                serde_json::json!({
                    "article_id": a.id,
                    "keyword": a.keyword,
                    "platform": a.platform,
                    "score": score,
                    "source": a.score_source,
                    "created_at": a.created_at,
                })
            })
        })
        .collect();
    points.reverse();
    HttpResponse::Ok().json(points)
}

#[derive(Deserialize)]
struct VerifyRateQuery {
    brand: Option<String>,
}

/// Mention rate over time: daily buckets per provider, oldest day first
async fn verifications(
    state: web::Data<AppState>,
    query: web::Query<VerifyRateQuery>,
) -> impl Responder {
    match state.storage.verify_rate_over_time(query.brand.as_deref()) {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(e) => storage_error(e),
    }
}

#[derive(Deserialize)]
struct OverviewQuery {
    brand: Option<String>,
}

/// Aggregate counts for the dashboard: saved keywords, generated articles
/// (with average score), optimizations and verification mention rate.
async fn overview(state: web::Data<AppState>, query: web::Query<OverviewQuery>) -> impl Responder {
    let brand = query.brand.as_deref();

    let keywords = match state.storage.list_keywords(brand) {
        Ok(k) => k,
        Err(e) => return storage_error(e),
    };
    let articles = match state.storage.list_articles(brand, None) {
        Ok(a) => a,
        Err(e) => return storage_error(e),
    };
    let optimizations = match state.storage.list_optimizations(brand) {
        Ok(o) => o,
        Err(e) => return storage_error(e),
    };
    let verify_results = match state.storage.list_verify_results(brand) {
        Ok(v) => v,
        Err(e) => return storage_error(e),
    };

    let scored: Vec<f64> = articles.iter().filter_map(|a| a.score).collect();
    let avg_score = if scored.is_empty() {
        None
    } else {
        Some(scored.iter().sum::<f64>() / scored.len() as f64)
    };

    let checked = verify_results.iter().filter(|r| r.error.is_none()).count();
    let mentioned = verify_results
        .iter()
        .filter(|r| r.error.is_none() && r.mentioned)
        .count();
    let mention_rate = if checked == 0 {
        None
    } else {
        Some(mentioned as f64 / checked as f64)
    };

    HttpResponse::Ok().json(serde_json::json!({
        "keywords": keywords.len(),
        "articles": articles.len(),
        "avg_score": avg_score,
        "optimizations": optimizations.len(),
        "verifications": verify_results.len(),
        "mention_rate": mention_rate,
    }))
}
