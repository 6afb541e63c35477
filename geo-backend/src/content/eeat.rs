//! E-E-A-T analysis and enhancement: Experience, Expertise,
//! Authoritativeness, Trustworthiness. Analysis is marker-counting;
//! enhancement asks the LLM to rewrite toward the weak dimensions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::prompts;
use crate::ai::{ChatService, Message};

static EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(I (?:have )?(?:used|tested|tried|worked with)|in my experience|we measured|hands[- ]on|我用过|亲测|实测|使用体验)").unwrap()
});
static EXPERTISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(years of experience|certified|engineer|specialist|Ph\.?D|专家|工程师|认证|资深)").unwrap()
});
static AUTHORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(according to|cited by|official|industry report|white ?paper|官方|行业报告|权威)").unwrap()
});
static TRUST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(however|on the other hand|limitation|drawback|transparent|guarantee|refund|但是|不过|缺点|局限)").unwrap()
});

pub const EEAT_DIMENSIONS: [&str; 4] =
    ["experience", "expertise", "authoritativeness", "trustworthiness"];

#[derive(Debug, Clone, Serialize)]
pub struct EeatScores {
    pub experience: u32,
    pub expertise: u32,
    pub authoritativeness: u32,
    pub trustworthiness: u32,
}

impl EeatScores {
    /// Dimensions scoring under 50, weakest first
    pub fn weak_dimensions(&self) -> Vec<&'static str> {
        let mut scored = vec![
            ("experience", self.experience),
            ("expertise", self.expertise),
            ("authoritativeness", self.authoritativeness),
            ("trustworthiness", self.trustworthiness),
        ];
        scored.sort_by_key(|(_, s)| *s);
        scored
            .into_iter()
            .filter(|(_, s)| *s < 50)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Marker-count heuristic: each matched marker adds 25 points, capped at 100
pub fn analyze(text: &str) -> EeatScores {
    EeatScores {
        experience: marker_score(&EXPERIENCE_RE, text),
        expertise: marker_score(&EXPERTISE_RE, text),
        authoritativeness: marker_score(&AUTHORITY_RE, text),
        trustworthiness: marker_score(&TRUST_RE, text),
    }
}

fn marker_score(re: &Regex, text: &str) -> u32 {
    (re.find_iter(text).count() as u32 * 25).min(100)
}

#[derive(Debug, Clone, Serialize)]
pub struct EeatEnhancement {
    pub text: String,
    pub targeted: Vec<&'static str>,
    pub before: EeatScores,
    pub after: EeatScores,
    pub unchanged: bool,
}

pub struct EeatEnhancer {
    service: Option<ChatService>,
}

impl EeatEnhancer {
    pub fn new(service: Option<ChatService>) -> Self {
        Self { service }
    }

    /// Rewrite toward the weakest dimensions. Nothing weak, or no LLM, or a
    /// failed call, returns the original flagged `unchanged`.
    pub async fn enhance(&self, text: &str) -> EeatEnhancement {
        let before = analyze(text);
        let targeted = before.weak_dimensions();

        if !targeted.is_empty() {
            if let Some(service) = &self.service {
                let prompt = prompts::EEAT_TEMPLATE
                    .replace("{dimensions}", &targeted.join(", "))
                    .replace("{text}", text);
                match service
                    .chat(
                        "eeat",
                        vec![Message::system(prompts::EEAT_SYSTEM), Message::user(prompt)],
                    )
                    .await
                {
                    Ok(reply) if !reply.trim().is_empty() => {
                        let after = analyze(&reply);
                        return EeatEnhancement {
                            text: reply.trim().to_string(),
                            targeted,
                            before,
                            after,
                            unchanged: false,
                        };
                    }
                    Ok(_) => log::warn!("[EEAT] Empty enhancement reply, keeping original"),
                    Err(e) => log::warn!("[EEAT] Enhancement failed: {}", e),
                }
            }
        }

        EeatEnhancement {
            text: text.to_string(),
            targeted,
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
    fn test_marker_scores() {
        let text = "In my experience as a certified engineer, according to the \
                    official industry report, however there are limitations.";
        let s = analyze(text);
        assert_eq!(s.experience, 25);
        assert_eq!(s.expertise, 50); // certified + engineer
        assert!(s.authoritativeness >= 50); // according to + official + industry report
        assert_eq!(s.trustworthiness, 50); // however + limitation
    }

    #[test]
    fn test_score_capped_at_100() {
        let text = "however however however however however however";
        assert_eq!(analyze(text).trustworthiness, 100);
    }

    #[test]
    fn test_weak_dimensions_sorted_weakest_first() {
        let s = EeatScores {
            experience: 0,
            expertise: 25,
            authoritativeness: 75,
            trustworthiness: 100,
        };
        assert_eq!(s.weak_dimensions(), vec!["experience", "expertise"]);
    }

    #[tokio::test]
    async fn test_enhance_without_service_unchanged() {
        let enhancer = EeatEnhancer::new(None);
        let result = enhancer.enhance("Bare claims with no markers.").await;
        assert!(result.unchanged);
        assert_eq!(result.targeted.len(), 4);
    }
}
