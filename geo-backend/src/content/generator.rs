//! Article generation per (keyword, platform) pair, plus cancellable batch
//! runs over keyword lists.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::metrics::{count_occurrences, word_count};
use super::prompts;
use crate::ai::{ChatService, Message};
use crate::models::{Article, Platform};
use crate::storage::DataStorage;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub keyword: String,
    pub platform: Platform,
    pub word_count: Option<usize>,
}

pub struct ContentGenerator {
    service: ChatService,
    storage: Arc<DataStorage>,
    brand: String,
}

impl ContentGenerator {
    pub fn new(service: ChatService, storage: Arc<DataStorage>, brand: &str) -> Self {
        Self {
            service,
            storage,
            brand: brand.to_string(),
        }
    }

    /// Generate one article and persist it. If the brand never shows up in
    /// the draft, one corrective regeneration is issued; a second miss is
    /// stored as-is with `brand_missing` set.
    pub async fn generate(&self, req: &GenerateRequest) -> Result<Article, String> {
        let settings_words = self.storage.get_app_settings()?.default_word_count;
        let target_words = resolve_word_count(req.word_count, settings_words, req.platform);

        let prompt = prompts::GENERATE_TEMPLATE
            .replace("{keyword}", &req.keyword)
            .replace("{brand}", &self.brand)
            .replace("{platform_style}", req.platform.style_directive())
            .replace("{word_count}", &target_words.to_string());

        let mut draft = self
            .service
            .chat(
                "generate",
                vec![
                    Message::system(prompts::GENERATE_SYSTEM),
                    Message::user(prompt),
                ],
            )
            .await?;

        let mut brand_missing = false;
        if count_occurrences(&draft, &self.brand) == 0 {
            log::warn!(
                "[GENERATE] Brand \"{}\" missing from draft for \"{}\", regenerating once",
                self.brand,
                req.keyword
            );
            let fix = prompts::BRAND_FIX_TEMPLATE
                .replace("{brand}", &self.brand)
                .replace("{draft}", &draft);
            match self
                .service
                .chat("generate", vec![Message::user(fix)])
                .await
            {
                Ok(fixed) if count_occurrences(&fixed, &self.brand) > 0 => {
                    draft = fixed;
                }
                Ok(_) | Err(_) => {
                    brand_missing = true;
                }
            }
        }

        let (title, body) = split_title(&draft);
        let article = Article {
            id: uuid::Uuid::new_v4().to_string(),
            brand: self.brand.clone(),
            keyword: req.keyword.clone(),
            platform: req.platform,
            title,
            word_count: word_count(&body) as i64,
            content: body,
            provider: self.service.provider().as_str().to_string(),
            model: self.service.model().to_string(),
            score: None,
            score_source: None,
            brand_missing,
            created_at: Utc::now(),
        };
        self.storage.save_article(&article)?;
        Ok(article)
    }

    /// Generate articles for a keyword list, polling the cancellation token
    /// between iterations. Each outcome is handed to `on_result` as it
    /// lands, so callers can report progress while the batch is running.
    pub async fn generate_batch(
        &self,
        keywords: &[String],
        platform: Platform,
        word_count: Option<usize>,
        token: &CancellationToken,
        mut on_result: impl FnMut(usize, usize, &Result<Article, String>),
    ) -> Vec<Result<Article, String>> {
        let mut results = Vec::new();
        let total = keywords.len();

        for (i, keyword) in keywords.iter().enumerate() {
            if token.is_cancelled() {
                log::info!(
                    "[GENERATE] Batch cancelled after {}/{} keywords",
                    i,
                    total
                );
                break;
            }
            let req = GenerateRequest {
                keyword: keyword.clone(),
                platform,
                word_count,
            };
            let result = self.generate(&req).await;
            on_result(i + 1, total, &result);
            results.push(result);
        }

        results
    }
}

/// Word-count target: the explicit request wins, then the app-wide setting
/// when it is non-zero, then the platform default.
fn resolve_word_count(requested: Option<usize>, settings_default: i64, platform: Platform) -> usize {
    requested
        .or_else(|| (settings_default > 0).then_some(settings_default as usize))
        .unwrap_or_else(|| platform.default_word_count())
}

/// First markdown-ish line becomes the title; the rest is the body
pub fn split_title(draft: &str) -> (String, String) {
    let trimmed = draft.trim();
    let mut lines = trimmed.lines();
    let first = lines.next().unwrap_or_default();
    let title = first
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();

    if title.is_empty() || body.is_empty() {
        // Single-block replies keep everything as the body
        return ("Untitled".to_string(), trimmed.to_string());
    }
    (title, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_prefers_request_then_setting() {
        assert_eq!(resolve_word_count(Some(300), 800, Platform::Blog), 300);
        assert_eq!(resolve_word_count(None, 800, Platform::Blog), 800);
        assert_eq!(
            resolve_word_count(None, 0, Platform::Weibo),
            Platform::Weibo.default_word_count()
        );
    }

    #[test]
    fn test_split_title_markdown_header() {
        let (title, body) = split_title("# Acme Review\n\nBody text here.");
        assert_eq!(title, "Acme Review");
        assert_eq!(body, "Body text here.");
    }

    #[test]
    fn test_split_title_plain_first_line() {
        let (title, body) = split_title("Acme in 2025\nThe rest of the article.");
        assert_eq!(title, "Acme in 2025");
        assert_eq!(body, "The rest of the article.");
    }

    #[test]
    fn test_split_title_single_block() {
        let (title, body) = split_title("Just one paragraph, no title.");
        assert_eq!(title, "Untitled");
        assert_eq!(body, "Just one paragraph, no title.");
    }
}
