//! Keyword mining: question-form and long-tail candidates with search-intent
//! labels, from an LLM when available and from surface heuristics otherwise.

use serde::Serialize;

use crate::ai::{extract, ChatService, Message};

const MINING_SYSTEM: &str = "You are an SEO keyword researcher. \
    You mine question-form and long-tail keywords for a topic. \
    You MUST respond with a valid JSON array of objects with fields \
    \"keyword\" and \"intent\" where intent is one of: informational, \
    commercial, transactional, navigational. \
    Do NOT include any text outside the JSON array.";

const QUESTION_TEMPLATES: &[&str] = &[
    "what is {}",
    "how does {} work",
    "why choose {}",
    "{} vs alternatives",
    "best {} 2025",
    "{} price comparison",
    "where to buy {}",
    "is {} reliable",
];

#[derive(Debug, Clone, Serialize)]
pub struct MinedKeyword {
    pub keyword: String,
    pub intent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MiningResult {
    pub keywords: Vec<MinedKeyword>,
    /// "llm" or "fallback"
    pub source: &'static str,
}

pub struct KeywordMining {
    service: Option<ChatService>,
}

impl KeywordMining {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    pub async fn mine(&self, topic: &str, brand: &str, count: usize) -> MiningResult {
        let topic = topic.trim();
        if topic.is_empty() || count == 0 {
            return MiningResult {
                keywords: Vec::new(),
                source: "fallback",
            };
        }

        if let Some(service) = &self.service {
            let prompt = format!(
                "Mine {} question-form and long-tail keywords for the topic \
                 \"{}\" (brand: \"{}\"). Label each with its search intent. \
                 Return a JSON array of {{\"keyword\", \"intent\"}} objects.",
                count, topic, brand
            );
            match service
                .chat(
                    "mining",
                    vec![Message::system(MINING_SYSTEM), Message::user(prompt)],
                )
                .await
            {
                Ok(reply) => {
                    let mined = parse_mined(&reply, brand, count);
                    if !mined.is_empty() {
                        return MiningResult {
                            keywords: mined,
                            source: "llm",
                        };
                    }
                    log::warn!("[MINING] Unparseable mining reply, using templates");
                }
                Err(e) => {
                    log::warn!("[MINING] LLM mining failed: {}", e);
                }
            }
        }

        MiningResult {
            keywords: fallback_mined(topic, brand, count),
            source: "fallback",
        }
    }
}

fn parse_mined(reply: &str, brand: &str, count: usize) -> Vec<MinedKeyword> {
    let Some(value) = extract::extract_array(reply) else {
        return Vec::new();
    };
    let Some(arr) = value.as_array() else {
        return Vec::new();
    };

    let mut out: Vec<MinedKeyword> = Vec::new();
    for item in arr {
        let keyword = match item.get("keyword").and_then(|v| v.as_str()) {
            Some(k) if !k.trim().is_empty() => k.trim().to_string(),
            _ => continue,
        };
        if out
            .iter()
            .any(|m| m.keyword.eq_ignore_ascii_case(&keyword))
        {
            continue;
        }
        let intent = item
            .get("intent")
            .and_then(|v| v.as_str())
            .filter(|i| is_valid_intent(i))
            .map(|i| i.to_lowercase())
            .unwrap_or_else(|| classify_intent(&keyword, brand).to_string());
        out.push(MinedKeyword { keyword, intent });
        if out.len() >= count {
            break;
        }
    }
    out
}

fn is_valid_intent(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "informational" | "commercial" | "transactional" | "navigational"
    )
}

/// Surface-heuristic intent labeling used when the model gives none
pub fn classify_intent(keyword: &str, brand: &str) -> &'static str {
    let k = keyword.to_lowercase();

    if k.contains("buy")
        || k.contains("price")
        || k.contains("discount")
        || k.contains("coupon")
        || k.contains("order")
    {
        return "transactional";
    }
    if k.contains("best") || k.contains(" vs") || k.contains("review") || k.contains("compare") {
        return "commercial";
    }
    if !brand.trim().is_empty() && k.contains(&brand.trim().to_lowercase()) {
        return "navigational";
    }
    "informational"
}

pub fn fallback_mined(topic: &str, brand: &str, count: usize) -> Vec<MinedKeyword> {
    QUESTION_TEMPLATES
        .iter()
        .take(count)
        .map(|t| {
            let keyword = t.replace("{}", topic);
            let intent = classify_intent(&keyword, brand).to_string();
            MinedKeyword { keyword, intent }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_intent() {
        assert_eq!(classify_intent("where to buy acme", "acme"), "transactional");
        assert_eq!(classify_intent("acme price comparison", "acme"), "transactional");
        assert_eq!(classify_intent("best widget tools", "acme"), "commercial");
        assert_eq!(classify_intent("widget vs gadget", "acme"), "commercial");
        assert_eq!(classify_intent("acme login portal", "acme"), "navigational");
        assert_eq!(classify_intent("how widgets work", "acme"), "informational");
    }

    #[test]
    fn test_parse_mined_with_intents() {
        let reply = r#"[
            {"keyword": "what is acme", "intent": "informational"},
            {"keyword": "acme pricing", "intent": "transactional"}
        ]"#;
        let out = parse_mined(reply, "acme", 10);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].intent, "transactional");
    }

    #[test]
    fn test_parse_mined_invalid_intent_reclassified() {
        let reply = r#"[{"keyword": "best acme plan", "intent": "promotional"}]"#;
        let out = parse_mined(reply, "acme", 10);
        assert_eq!(out[0].intent, "commercial");
    }

    #[test]
    fn test_parse_mined_dedups_and_limits() {
        let reply = r#"[
            {"keyword": "what is acme", "intent": "informational"},
            {"keyword": "What Is Acme", "intent": "informational"},
            {"keyword": "acme pricing", "intent": "transactional"}
        ]"#;
        let out = parse_mined(reply, "acme", 1);
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_mine_without_service_uses_templates() {
        let mining = KeywordMining::new(None);
        let result = mining.mine("cloud backup", "acme", 4).await;
        assert_eq!(result.source, "fallback");
        assert_eq!(result.keywords.len(), 4);
        assert_eq!(result.keywords[0].keyword, "what is cloud backup");
        assert_eq!(result.keywords[0].intent, "informational");
    }
}
