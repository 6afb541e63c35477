use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target publishing platform. Each platform carries its own style and
/// length directives in the generation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Zhihu,
    Baijiahao,
    Toutiao,
    Weibo,
    Wechat,
    Blog,
}

impl Platform {
    pub fn all() -> Vec<Platform> {
        vec![
            Platform::Zhihu,
            Platform::Baijiahao,
            Platform::Toutiao,
            Platform::Weibo,
            Platform::Wechat,
            Platform::Blog,
        ]
    }

    pub fn from_str(s: &str) -> Option<Platform> {
        match s.to_lowercase().as_str() {
            "zhihu" => Some(Platform::Zhihu),
            "baijiahao" => Some(Platform::Baijiahao),
            "toutiao" => Some(Platform::Toutiao),
            "weibo" => Some(Platform::Weibo),
            "wechat" => Some(Platform::Wechat),
            "blog" => Some(Platform::Blog),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Zhihu => "zhihu",
            Platform::Baijiahao => "baijiahao",
            Platform::Toutiao => "toutiao",
            Platform::Weibo => "weibo",
            Platform::Wechat => "wechat",
            Platform::Blog => "blog",
        }
    }

    /// Style directive embedded in the generation prompt
    pub fn style_directive(&self) -> &'static str {
        match self {
            Platform::Zhihu => {
                "Q&A format with an authoritative, experience-backed voice. Open by \
                 restating the question, answer it directly in the first paragraph, \
                 then expand with evidence."
            }
            Platform::Baijiahao => {
                "News-style article with a factual headline, short paragraphs, and \
                 an inverted-pyramid structure."
            }
            Platform::Toutiao => {
                "Engaging feed article: hook in the first two sentences, subheadings \
                 every few paragraphs, concrete examples."
            }
            Platform::Weibo => {
                "Short-form post under 300 words, punchy, with a clear takeaway and \
                 one or two memorable statistics."
            }
            Platform::Wechat => {
                "Long-form public-account article with section headers, practical \
                 advice, and a summary list at the end."
            }
            Platform::Blog => {
                "SEO blog post with an H1 title, H2 section headers, a FAQ section, \
                 and a conclusion."
            }
        }
    }

    /// Default word-count target per platform
    pub fn default_word_count(&self) -> usize {
        match self {
            Platform::Weibo => 250,
            Platform::Toutiao | Platform::Baijiahao => 800,
            Platform::Zhihu | Platform::Wechat => 1200,
            Platform::Blog => 1500,
        }
    }
}

/// A generated article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub brand: String,
    pub keyword: String,
    pub platform: Platform,
    pub title: String,
    pub content: String,
    pub word_count: i64,
    pub provider: String,
    pub model: String,
    /// Overall GEO score if the article has been scored
    pub score: Option<f64>,
    /// How the stored score was produced: "llm" or "heuristic"
    #[serde(default)]
    pub score_source: Option<String>,
    /// Set when the brand never appeared even after corrective regeneration
    pub brand_missing: bool,
    pub created_at: DateTime<Utc>,
}

/// An optimization pass over an existing article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimization {
    pub id: String,
    pub article_id: String,
    pub brand: String,
    pub keyword: String,
    pub directives: Vec<String>,
    pub original_content: String,
    pub optimized_content: String,
    pub original_score: f64,
    pub optimized_score: f64,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}
