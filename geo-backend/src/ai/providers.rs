//! Supported chat-completion providers.
//!
//! All providers expose OpenAI-compatible endpoints; each entry here carries
//! the endpoint URL, the default model, and advisory per-1k-token pricing
//! used for the cost log.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DeepSeek,
    OpenAI,
    Tongyi,
    Groq,
    Moonshot,
    Doubao,
    Wenxin,
}

impl ProviderId {
    pub fn all() -> Vec<ProviderId> {
        vec![
            ProviderId::DeepSeek,
            ProviderId::OpenAI,
            ProviderId::Tongyi,
            ProviderId::Groq,
            ProviderId::Moonshot,
            ProviderId::Doubao,
            ProviderId::Wenxin,
        ]
    }

    pub fn from_str(s: &str) -> Option<ProviderId> {
        match s.to_lowercase().as_str() {
            "deepseek" => Some(ProviderId::DeepSeek),
            "openai" => Some(ProviderId::OpenAI),
            "tongyi" | "dashscope" | "qwen" => Some(ProviderId::Tongyi),
            "groq" => Some(ProviderId::Groq),
            "moonshot" | "kimi" => Some(ProviderId::Moonshot),
            "doubao" | "ark" => Some(ProviderId::Doubao),
            "wenxin" | "qianfan" | "ernie" => Some(ProviderId::Wenxin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek",
            ProviderId::OpenAI => "openai",
            ProviderId::Tongyi => "tongyi",
            ProviderId::Groq => "groq",
            ProviderId::Moonshot => "moonshot",
            ProviderId::Doubao => "doubao",
            ProviderId::Wenxin => "wenxin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "DeepSeek",
            ProviderId::OpenAI => "OpenAI",
            ProviderId::Tongyi => "Tongyi Qianwen",
            ProviderId::Groq => "Groq",
            ProviderId::Moonshot => "Moonshot Kimi",
            ProviderId::Doubao => "Doubao",
            ProviderId::Wenxin => "Wenxin Yiyan",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
            ProviderId::OpenAI => "https://api.openai.com/v1/chat/completions",
            ProviderId::Tongyi => {
                "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
            }
            ProviderId::Groq => "https://api.groq.com/openai/v1/chat/completions",
            ProviderId::Moonshot => "https://api.moonshot.cn/v1/chat/completions",
            ProviderId::Doubao => "https://ark.cn-beijing.volces.com/api/v3/chat/completions",
            ProviderId::Wenxin => "https://qianfan.baidubce.com/v2/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek-chat",
            ProviderId::OpenAI => "gpt-4o-mini",
            ProviderId::Tongyi => "qwen-plus",
            ProviderId::Groq => "llama-3.3-70b-versatile",
            ProviderId::Moonshot => "moonshot-v1-8k",
            ProviderId::Doubao => "doubao-pro-32k",
            ProviderId::Wenxin => "ernie-4.0-8k",
        }
    }

    /// Advisory USD prices per 1k tokens: (prompt, completion)
    pub fn price_per_1k(&self) -> (f64, f64) {
        match self {
            ProviderId::DeepSeek => (0.00014, 0.00028),
            ProviderId::OpenAI => (0.00015, 0.0006),
            ProviderId::Tongyi => (0.0004, 0.0012),
            ProviderId::Groq => (0.00059, 0.00079),
            ProviderId::Moonshot => (0.0017, 0.0017),
            ProviderId::Doubao => (0.00011, 0.00028),
            ProviderId::Wenxin => (0.0042, 0.0084),
        }
    }

    /// Estimated cost of one call in USD
    pub fn estimate_cost(&self, prompt_tokens: i64, completion_tokens: i64) -> f64 {
        let (prompt_price, completion_price) = self.price_per_1k();
        (prompt_tokens as f64 / 1000.0) * prompt_price
            + (completion_tokens as f64 / 1000.0) * completion_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(ProviderId::from_str("DeepSeek"), Some(ProviderId::DeepSeek));
        assert_eq!(ProviderId::from_str("kimi"), Some(ProviderId::Moonshot));
        assert_eq!(ProviderId::from_str("qwen"), Some(ProviderId::Tongyi));
        assert_eq!(ProviderId::from_str("ernie"), Some(ProviderId::Wenxin));
        assert_eq!(ProviderId::from_str("unknown"), None);
    }

    #[test]
    fn test_roundtrip_all() {
        for p in ProviderId::all() {
            assert_eq!(ProviderId::from_str(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_estimate_cost() {
        let cost = ProviderId::DeepSeek.estimate_cost(1000, 1000);
        assert!((cost - 0.00042).abs() < 1e-9);
        assert_eq!(ProviderId::OpenAI.estimate_cost(0, 0), 0.0);
    }
}
