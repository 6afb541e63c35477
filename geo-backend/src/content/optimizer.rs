//! Article optimization: rewrite an existing article toward GEO directives
//! and record before/after scores.

use chrono::Utc;
use std::sync::Arc;

use super::prompts;
use super::scorer::ContentScorer;
use crate::ai::{ChatService, Message};
use crate::models::{Article, Optimization};
use crate::storage::DataStorage;

pub const DEFAULT_DIRECTIVES: [&str; 3] =
    ["citability", "fact injection", "structure"];

pub struct ArticleOptimizer {
    service: ChatService,
    storage: Arc<DataStorage>,
}

impl ArticleOptimizer {
    pub fn new(service: ChatService, storage: Arc<DataStorage>) -> Self {
        Self { service, storage }
    }

    /// Optimize an article and persist the `Optimization` record. Scoring of
    /// both versions goes through the usual scorer (LLM with heuristic
    /// fallback).
    pub async fn optimize(
        &self,
        article: &Article,
        directives: &[String],
    ) -> Result<Optimization, String> {
        let directives: Vec<String> = if directives.is_empty() {
            DEFAULT_DIRECTIVES.iter().map(|s| s.to_string()).collect()
        } else {
            directives.to_vec()
        };

        let prompt = prompts::OPTIMIZE_TEMPLATE
            .replace("{directives}", &directives.join(", "))
            .replace("{keyword}", &article.keyword)
            .replace("{brand}", &article.brand)
            .replace("{text}", &article.content);

        let optimized = self
            .service
            .chat(
                "optimize",
                vec![
                    Message::system(prompts::OPTIMIZE_SYSTEM),
                    Message::user(prompt),
                ],
            )
            .await?;
        let optimized = optimized.trim().to_string();
        if optimized.is_empty() {
            return Err("Optimizer returned an empty article".to_string());
        }

        let scorer = ContentScorer::new(Some(self.service.clone()));
        let original_score = scorer
            .score(&article.content, &article.keyword, &article.brand)
            .await;
        let optimized_score = scorer
            .score(&optimized, &article.keyword, &article.brand)
            .await;

        let record = Optimization {
            id: uuid::Uuid::new_v4().to_string(),
            article_id: article.id.clone(),
            brand: article.brand.clone(),
            keyword: article.keyword.clone(),
            directives,
            original_content: article.content.clone(),
            optimized_content: optimized,
            original_score: original_score.overall,
            optimized_score: optimized_score.overall,
            provider: self.service.provider().as_str().to_string(),
            created_at: Utc::now(),
        };
        self.storage.save_optimization(&record)?;
        Ok(record)
    }
}
