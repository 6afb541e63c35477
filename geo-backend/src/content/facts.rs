//! Fact-density measurement and enhancement. Density is a count of numeric
//! facts, percentages, years, quoted attributions and citation markers per
//! 100 words.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::metrics::word_count;
use super::prompts;
use crate::ai::{ChatService, Message};

static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s*[%％]").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:[,.]\d+)*\b").unwrap());
static ATTRIBUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(according to|as reported by|a study (?:by|from)|data from|调查显示|数据显示|研究表明|据.{1,12}报道)").unwrap()
});
static CITATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]|\[来源\]|\[source\]").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct FactDensity {
    pub numbers: usize,
    pub percentages: usize,
    pub years: usize,
    pub attributions: usize,
    pub citations: usize,
    /// Facts per 100 words
    pub density: f64,
}

pub fn fact_density(text: &str) -> FactDensity {
    let percentages = PERCENT_RE.find_iter(text).count();
    let years = YEAR_RE.find_iter(text).count();
    // Plain numbers that are not already counted as percentages or years
    let numbers = NUMBER_RE
        .find_iter(text)
        .count()
        .saturating_sub(percentages + years);
    let attributions = ATTRIBUTION_RE.find_iter(text).count();
    let citations = CITATION_RE.find_iter(text).count();

    let facts = numbers + percentages + years + attributions + citations;
    let words = word_count(text);
    let density = if words == 0 {
        0.0
    } else {
        facts as f64 * 100.0 / words as f64
    };

    FactDensity {
        numbers,
        percentages,
        years,
        attributions,
        citations,
        density,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FactEnhancement {
    pub text: String,
    pub before: FactDensity,
    pub after: FactDensity,
    /// Set when the LLM path failed and the original text was returned
    pub unchanged: bool,
}

pub struct FactDensityEnhancer {
    service: Option<ChatService>,
}

impl FactDensityEnhancer {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    /// Rewrite the article with more verifiable facts. Without an LLM (or on
    /// failure) the original text comes back flagged `unchanged`.
    pub async fn enhance(&self, text: &str, keyword: &str) -> FactEnhancement {
        let before = fact_density(text);

        if let Some(service) = &self.service {
            let prompt = prompts::FACTS_TEMPLATE
                .replace("{keyword}", keyword)
                .replace("{text}", text);
            match service
                .chat(
                    "facts",
                    vec![Message::system(prompts::FACTS_SYSTEM), Message::user(prompt)],
                )
                .await
            {
                Ok(reply) if !reply.trim().is_empty() => {
                    let after = fact_density(&reply);
                    return FactEnhancement {
                        text: reply.trim().to_string(),
                        before,
                        after,
                        unchanged: false,
                    };
                }
                Ok(_) => log::warn!("[FACTS] Empty enhancement reply, keeping original"),
                Err(e) => log::warn!("[FACTS] Enhancement failed: {}", e),
            }
        }

        FactEnhancement {
            text: text.to_string(),
            after: before.clone(),
            before,
            unchanged: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_percentages_and_years() {
        let text = "In 2024, adoption grew 45% according to industry data.";
        let d = fact_density(text);
        assert_eq!(d.years, 1);
        assert_eq!(d.percentages, 1);
        assert_eq!(d.attributions, 1);
    }

    #[test]
    fn test_plain_numbers_not_double_counted() {
        let text = "We shipped 12 releases; uptime was 99.9% through 2023.";
        let d = fact_density(text);
        assert_eq!(d.percentages, 1);
        assert_eq!(d.years, 1);
        assert_eq!(d.numbers, 1); // only "12"
    }

    #[test]
    fn test_citation_markers() {
        let d = fact_density("Measured latency fell by half [1] and cost too [source].");
        assert_eq!(d.citations, 2);
    }

    #[test]
    fn test_density_zero_for_empty() {
        assert_eq!(fact_density("").density, 0.0);
    }

    #[tokio::test]
    async fn test_enhance_without_service_returns_unchanged() {
        let enhancer = FactDensityEnhancer::new(None);
        let result = enhancer.enhance("Plain text.", "acme").await;
        assert!(result.unchanged);
        assert_eq!(result.text, "Plain text.");
    }
}
