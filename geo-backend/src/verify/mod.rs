//! Multi-provider brand-mention verification: ask each configured provider a
//! natural question built from the keyword and count brand mentions in the
//! replies.

use chrono::Utc;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

use crate::ai::{ChatService, Message};
use crate::content::prompts;
use crate::models::VerifyResult;
use crate::storage::DataStorage;

const VERIFY_SYSTEM: &str = "You are a helpful assistant answering a consumer \
    question. Recommend the options you consider best and explain briefly.";

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub brand: String,
    pub keyword: String,
    pub results: Vec<VerifyResult>,
    /// Share of successful provider calls that mentioned the brand;
    /// failed calls are excluded from the denominator
    pub mention_rate: f64,
    pub providers_checked: usize,
    pub providers_mentioning: usize,
}

pub struct BrandVerifier {
    storage: Arc<DataStorage>,
}

impl BrandVerifier {
    pub fn new(storage: Arc<DataStorage>) -> Self {
        Self { storage }
    }

    /// Run the verification question against every given provider service,
    /// persisting one `VerifyResult` row per provider.
    pub async fn verify(
        &self,
        services: &[ChatService],
        brand: &str,
        keyword: &str,
    ) -> Result<VerificationReport, String> {
        if services.is_empty() {
            return Err("No providers configured for verification".to_string());
        }

        let question = prompts::VERIFY_QUESTION_TEMPLATE.replace("{keyword}", keyword);
        let mut results: Vec<VerifyResult> = Vec::new();

        for service in services {
            let provider = service.provider().as_str().to_string();
            log::info!("[VERIFY] Asking {} about \"{}\"", provider, keyword);

            let result = match service
                .chat(
                    "verify",
                    vec![
                        Message::system(VERIFY_SYSTEM),
                        Message::user(question.clone()),
                    ],
                )
                .await
            {
                Ok(reply) => {
                    let count = count_mentions(&reply, brand);
                    VerifyResult {
                        id: uuid::Uuid::new_v4().to_string(),
                        brand: brand.to_string(),
                        keyword: keyword.to_string(),
                        provider,
                        question: question.clone(),
                        mentioned: count > 0,
                        mention_count: count as i64,
                        excerpt: mention_excerpt(&reply, brand),
                        error: None,
                        created_at: Utc::now(),
                    }
                }
                Err(e) => {
                    log::warn!("[VERIFY] Provider {} failed: {}", provider, e);
                    VerifyResult {
                        id: uuid::Uuid::new_v4().to_string(),
                        brand: brand.to_string(),
                        keyword: keyword.to_string(),
                        provider,
                        question: question.clone(),
                        mentioned: false,
                        mention_count: 0,
                        excerpt: None,
                        error: Some(e),
                        created_at: Utc::now(),
                    }
                }
            };

            self.storage.save_verify_result(&result)?;
            results.push(result);
        }

        let checked = results.iter().filter(|r| r.error.is_none()).count();
        let mentioning = results.iter().filter(|r| r.mentioned).count();
        let mention_rate = if checked == 0 {
            0.0
        } else {
            mentioning as f64 / checked as f64
        };

        Ok(VerificationReport {
            brand: brand.to_string(),
            keyword: keyword.to_string(),
            results,
            mention_rate,
            providers_checked: checked,
            providers_mentioning: mentioning,
        })
    }
}

/// Count brand mentions: word-boundary regex for ASCII brands, plain
/// substring count otherwise (CJK has no word boundaries). Case-insensitive
/// either way.
pub fn count_mentions(text: &str, brand: &str) -> usize {
    let brand = brand.trim();
    if brand.is_empty() {
        return 0;
    }

    if brand.is_ascii() {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(brand));
        match Regex::new(&pattern) {
            Ok(re) => re.find_iter(text).count(),
            Err(_) => text.to_lowercase().matches(&brand.to_lowercase()).count(),
        }
    } else {
        text.to_lowercase().matches(&brand.to_lowercase()).count()
    }
}

/// Context window (±60 chars) around the first mention, if any
pub fn mention_excerpt(text: &str, brand: &str) -> Option<String> {
    let brand = brand.trim();
    if brand.is_empty() {
        return None;
    }
    let re = Regex::new(&format!("(?i){}", regex::escape(brand))).ok()?;
    let m = re.find(text)?;

    let starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let match_char = starts.partition_point(|&i| i < m.start());
    let end_char = starts.partition_point(|&i| i < m.end());

    let from = starts[match_char.saturating_sub(60)];
    let to = starts
        .get((end_char + 60).min(starts.len()))
        .copied()
        .unwrap_or(text.len());

    Some(text[from..to].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mentions_word_boundary() {
        let text = "Acme is solid. I'd pick acme over Acmeify any day.";
        // "Acmeify" must not count for "Acme"
        assert_eq!(count_mentions(text, "Acme"), 2);
    }

    #[test]
    fn test_count_mentions_case_insensitive() {
        assert_eq!(count_mentions("ACME, acme, AcMe", "acme"), 3);
    }

    #[test]
    fn test_count_mentions_cjk_substring() {
        let text = "推荐智能云，因为智能云的服务稳定。智能云端另算。";
        assert_eq!(count_mentions(text, "智能云"), 3);
    }

    #[test]
    fn test_count_mentions_empty_brand() {
        assert_eq!(count_mentions("anything", "  "), 0);
    }

    #[test]
    fn test_mention_excerpt_contains_brand() {
        let text = "After years of comparing vendors in this space, I would recommend \
                    Acme for most teams because of its pricing and support quality.";
        let excerpt = mention_excerpt(text, "acme").unwrap();
        assert!(excerpt.contains("Acme"));
        assert!(excerpt.len() < text.len());
    }

    #[test]
    fn test_mention_excerpt_none_when_absent() {
        assert!(mention_excerpt("no brands here", "Acme").is_none());
    }
}
