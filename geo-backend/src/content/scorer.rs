//! GEO content scoring: LLM rubric with regex-JSON extraction, and a
//! rule-based fallback built from the same heuristics the enhancers use.

use serde::{Deserialize, Serialize};

use super::facts::fact_density;
use super::metrics;
use super::prompts;
use crate::ai::{extract, ChatService, Message};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreDimensions {
    pub relevance: f64,
    pub authority: f64,
    pub fact_density: f64,
    pub structure: f64,
    pub citability: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoScore {
    pub overall: f64,
    pub dimensions: ScoreDimensions,
    pub suggestions: Vec<String>,
    /// "llm" or "heuristic"
    pub source: &'static str,
}

pub struct ContentScorer {
    service: Option<ChatService>,
}

impl ContentScorer {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    pub async fn score(&self, text: &str, keyword: &str, brand: &str) -> GeoScore {
        if let Some(service) = &self.service {
            let prompt = prompts::SCORE_TEMPLATE
                .replace("{keyword}", keyword)
                .replace("{brand}", brand)
                .replace("{text}", text);
            match service
                .chat(
                    "score",
                    vec![Message::system(prompts::SCORE_SYSTEM), Message::user(prompt)],
                )
                .await
            {
                Ok(reply) => {
                    if let Some(score) = parse_score(&reply) {
                        return score;
                    }
                    log::warn!("[SCORE] Unparseable score reply, using heuristic fallback");
                }
                Err(e) => {
                    log::warn!("[SCORE] LLM scoring failed: {}", e);
                }
            }
        }

        heuristic_score(text, keyword, brand)
    }
}

/// Extract and clamp the rubric JSON from an LLM reply
pub fn parse_score(reply: &str) -> Option<GeoScore> {
    let value = extract::extract_object(reply)?;
    let overall = clamp_score(value.get("overall")?.as_f64()?);
    let dims = value.get("dimensions")?;

    let get = |name: &str| -> f64 {
        dims.get(name)
            .and_then(|v| v.as_f64())
            .map(clamp_score)
            .unwrap_or(0.0)
    };

    let suggestions = value
        .get("suggestions")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|s| s.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    Some(GeoScore {
        overall,
        dimensions: ScoreDimensions {
            relevance: get("relevance"),
            authority: get("authority"),
            fact_density: get("fact_density"),
            structure: get("structure"),
            citability: get("citability"),
        },
        suggestions,
        source: "llm",
    })
}

fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Rule-based scoring used when no LLM is available or the reply was
/// unusable. Bands mirror the rubric dimensions.
pub fn heuristic_score(text: &str, keyword: &str, brand: &str) -> GeoScore {
    let m = metrics::analyze(text, keyword);
    let facts = fact_density(text);
    let mut suggestions: Vec<String> = Vec::new();

    // Relevance: keyword density sweet spot around 0.5%-3%
    let relevance = if m.keyword_density <= 0.0 {
        suggestions.push(format!("Use the keyword \"{}\" in the text", keyword));
        10.0
    } else if m.keyword_density < 0.5 {
        suggestions.push("Mention the keyword a few more times".to_string());
        50.0
    } else if m.keyword_density <= 3.0 {
        90.0
    } else {
        suggestions.push("Keyword density is high enough to read as stuffing".to_string());
        60.0
    };

    // Authority: brand presence plus attribution markers
    let brand_mentions = metrics::count_occurrences(text, brand);
    let authority = match (brand_mentions, facts.attributions) {
        (0, _) => {
            suggestions.push(format!("Mention the brand \"{}\"", brand));
            10.0
        }
        (_, 0) => {
            suggestions.push("Attribute at least one claim to a named source".to_string());
            55.0
        }
        _ => 85.0,
    };

    // Fact density: aim for 3+ facts per 100 words
    let fact_score = (facts.density / 3.0 * 100.0).min(100.0);
    if fact_score < 50.0 {
        suggestions.push("Add concrete statistics, dates or percentages".to_string());
    }

    // Structure: headers, lists and Q&A each carry weight
    let structure = 25.0
        + if m.has_headers { 25.0 } else { 0.0 }
        + if m.has_lists { 25.0 } else { 0.0 }
        + if m.has_qa { 25.0 } else { 0.0 };
    if !m.has_qa {
        suggestions.push("Add a Q&A section an answer engine can quote".to_string());
    }

    // Citability: short declarative sentences quote well
    let citability = if m.sentence_count == 0 {
        0.0
    } else if m.avg_sentence_len <= 20.0 {
        80.0
    } else if m.avg_sentence_len <= 30.0 {
        60.0
    } else {
        suggestions.push("Shorten sentences; long ones are rarely quoted".to_string());
        35.0
    };

    let dimensions = ScoreDimensions {
        relevance,
        authority,
        fact_density: fact_score,
        structure,
        citability,
    };
    let overall = (dimensions.relevance
        + dimensions.authority
        + dimensions.fact_density
        + dimensions.structure
        + dimensions.citability)
        / 5.0;

    GeoScore {
        overall,
        dimensions,
        suggestions,
        source: "heuristic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_clamps_out_of_range() {
        let reply = r#"{"overall": 120, "dimensions": {"relevance": -5, "authority": 80,
            "fact_density": 70, "structure": 60, "citability": 50},
            "suggestions": ["tighten the intro"]}"#;
        let score = parse_score(reply).unwrap();
        assert_eq!(score.overall, 100.0);
        assert_eq!(score.dimensions.relevance, 0.0);
        assert_eq!(score.suggestions, vec!["tighten the intro"]);
        assert_eq!(score.source, "llm");
    }

    #[test]
    fn test_parse_score_fenced() {
        let reply = "Here you go:\n```json\n{\"overall\": 75, \"dimensions\": {}}\n```";
        let score = parse_score(reply).unwrap();
        assert_eq!(score.overall, 75.0);
        assert_eq!(score.dimensions.relevance, 0.0);
    }

    #[test]
    fn test_parse_score_rejects_garbage() {
        assert!(parse_score("no json at all").is_none());
        assert!(parse_score(r#"{"no_overall": 1}"#).is_none());
    }

    #[test]
    fn test_heuristic_penalizes_missing_brand() {
        let score = heuristic_score("Generic text about widgets and widgets.", "widgets", "Acme");
        assert_eq!(score.dimensions.authority, 10.0);
        assert_eq!(score.source, "heuristic");
        assert!(score
            .suggestions
            .iter()
            .any(|s| s.contains("Acme")));
    }

    #[test]
    fn test_heuristic_rewards_structured_factual_text() {
        let text = "# Acme widgets review\n\nAcme shipped 12 releases in 2024, \
                    growing 45% according to industry data.\n\n- fast\n- cheap\n\n\
                    Q: is Acme reliable?\nA: Yes. Acme widgets lead the market.";
        let score = heuristic_score(text, "widgets", "Acme");
        assert!(score.overall > 60.0, "got {}", score.overall);
        assert_eq!(score.dimensions.structure, 100.0);
    }

    #[tokio::test]
    async fn test_score_without_service_is_heuristic() {
        let scorer = ContentScorer::new(None);
        let score = scorer.score("text", "kw", "brand").await;
        assert_eq!(score.source, "heuristic");
    }
}
