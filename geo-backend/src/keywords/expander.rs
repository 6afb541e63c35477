//! Semantic keyword expansion: LLM-driven with a template fallback that
//! never fails.

use serde::Serialize;

use crate::ai::{extract, ChatService, Message};

/// System prompt for expansion — enforces JSON-only output.
const EXPAND_SYSTEM: &str = "You are an SEO keyword strategist. \
    You expand a seed keyword into semantically related search phrases. \
    You MUST respond with a valid JSON array of strings only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Fallback variant templates, applied when no LLM is available or the
/// reply is unusable. `{}` is replaced with the seed.
const FALLBACK_TEMPLATES: &[&str] = &[
    "how to use {}",
    "what is {}",
    "{} review",
    "{} price",
    "{} alternatives",
    "{} vs competitors",
    "best {}",
    "{} tutorial",
    "is {} worth it",
    "{} pros and cons",
];

#[derive(Debug, Clone, Serialize)]
pub struct ExpansionResult {
    pub keywords: Vec<String>,
    /// "llm" or "fallback"
    pub source: &'static str,
}

pub struct SemanticExpander {
    service: Option<ChatService>,
}

impl SemanticExpander {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    /// Expand a seed keyword into up to `count` related phrases
    pub async fn expand(&self, seed: &str, count: usize) -> ExpansionResult {
        let seed = seed.trim();
        if seed.is_empty() || count == 0 {
            return ExpansionResult {
                keywords: Vec::new(),
                source: "fallback",
            };
        }

        if let Some(service) = &self.service {
            let prompt = format!(
                "Expand the seed keyword \"{}\" into {} related search phrases \
                 real users would type. Mix question forms, comparisons, and \
                 long-tail variants. Return a JSON array of strings.",
                seed, count
            );
            match service
                .chat(
                    "expand",
                    vec![Message::system(EXPAND_SYSTEM), Message::user(prompt)],
                )
                .await
            {
                Ok(reply) => {
                    let parsed = parse_keyword_list(&reply);
                    if !parsed.is_empty() {
                        return ExpansionResult {
                            keywords: dedup_against_seed(parsed, seed, count),
                            source: "llm",
                        };
                    }
                    log::warn!("[EXPAND] Unparseable expansion reply, using fallback");
                }
                Err(e) => {
                    log::warn!("[EXPAND] LLM expansion failed: {}", e);
                }
            }
        }

        ExpansionResult {
            keywords: fallback_expansions(seed, count),
            source: "fallback",
        }
    }
}

/// Parse a reply as a JSON string array, falling back to splitting
/// numbered/bulleted lines.
pub fn parse_keyword_list(reply: &str) -> Vec<String> {
    if let Some(value) = extract::extract_array(reply) {
        if let Some(arr) = value.as_array() {
            let items: Vec<String> = arr
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !items.is_empty() {
                return items;
            }
        }
    }

    // Line fallback: strip list markers ("1.", "-", "*", "•")
    reply
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .trim_matches('"')
                .to_string()
        })
        .filter(|l| !l.is_empty() && l.chars().count() <= 80 && !l.ends_with(':'))
        .collect()
}

fn dedup_against_seed(keywords: Vec<String>, seed: &str, count: usize) -> Vec<String> {
    let seed_norm = seed.trim().to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for kw in keywords {
        let norm = kw.trim().to_lowercase();
        if norm.is_empty() || norm == seed_norm {
            continue;
        }
        if out.iter().any(|k| k.trim().to_lowercase() == norm) {
            continue;
        }
        out.push(kw.trim().to_string());
        if out.len() >= count {
            break;
        }
    }
    out
}

/// Template-driven variants; never fails, never empty for a non-empty seed
pub fn fallback_expansions(seed: &str, count: usize) -> Vec<String> {
    FALLBACK_TEMPLATES
        .iter()
        .take(count)
        .map(|t| t.replace("{}", seed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array_reply() {
        let out = parse_keyword_list(r#"["acme review", "acme pricing"]"#);
        assert_eq!(out, vec!["acme review", "acme pricing"]);
    }

    #[test]
    fn test_parse_numbered_lines() {
        let reply = "Here are some ideas:\n1. acme review\n2. acme pricing\n- acme vs rivals";
        let out = parse_keyword_list(reply);
        assert!(out.contains(&"acme review".to_string()));
        assert!(out.contains(&"acme pricing".to_string()));
        assert!(out.contains(&"acme vs rivals".to_string()));
        // The "Here are some ideas:" header line is dropped
        assert!(!out.iter().any(|l| l.contains("ideas")));
    }

    #[test]
    fn test_fallback_expansions() {
        let out = fallback_expansions("acme", 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], "how to use acme");
        assert!(out.iter().all(|k| k.contains("acme")));
    }

    #[test]
    fn test_dedup_against_seed() {
        let out = dedup_against_seed(
            vec![
                "Acme".to_string(),
                "acme review".to_string(),
                "ACME REVIEW".to_string(),
                "acme pricing".to_string(),
            ],
            "acme",
            10,
        );
        assert_eq!(out, vec!["acme review", "acme pricing"]);
    }

    #[tokio::test]
    async fn test_expand_without_service_uses_fallback() {
        let expander = SemanticExpander::new(None);
        let result = expander.expand("acme", 5).await;
        assert_eq!(result.source, "fallback");
        assert_eq!(result.keywords.len(), 5);
    }

    #[tokio::test]
    async fn test_expand_empty_seed() {
        let expander = SemanticExpander::new(None);
        let result = expander.expand("  ", 5).await;
        assert!(result.keywords.is_empty());
    }
}
