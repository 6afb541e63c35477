use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a stored keyword came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordSource {
    Combinator,
    Expansion,
    Cluster,
    Mining,
    Manual,
}

impl KeywordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordSource::Combinator => "combinator",
            KeywordSource::Expansion => "expansion",
            KeywordSource::Cluster => "cluster",
            KeywordSource::Mining => "mining",
            KeywordSource::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> KeywordSource {
        match s {
            "combinator" => KeywordSource::Combinator,
            "expansion" => KeywordSource::Expansion,
            "cluster" => KeywordSource::Cluster,
            "mining" => KeywordSource::Mining,
            _ => KeywordSource::Manual,
        }
    }
}

/// A candidate keyword tracked for a brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub brand: String,
    pub keyword: String,
    pub source: KeywordSource,
    /// Cluster or wordbank category the keyword was filed under, if any
    pub category: Option<String>,
    /// Search intent label: informational / commercial / transactional / navigational
    pub intent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Keyword {
    pub fn new(brand: &str, keyword: &str, source: KeywordSource) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            brand: brand.to_string(),
            keyword: keyword.to_string(),
            source,
            category: None,
            intent: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_intent(mut self, intent: &str) -> Self {
        self.intent = Some(intent.to_string());
        self
    }
}
