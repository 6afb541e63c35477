use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application settings stored in the database (there's only one row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub id: i64,
    /// Brand name injected into prompts and counted during verification
    pub brand: String,
    /// Provider used when a request doesn't name one
    pub active_provider: String,
    pub default_platform: String,
    /// App-wide word-count target; 0 defers to per-platform defaults
    pub default_word_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            id: 0,
            brand: String::new(),
            active_provider: "deepseek".to_string(),
            default_platform: "blog".to_string(),
            default_word_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppSettingsRequest {
    pub brand: Option<String>,
    pub active_provider: Option<String>,
    pub default_platform: Option<String>,
    pub default_word_count: Option<i64>,
}

/// API key (plus optional model/endpoint overrides) for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderKey {
    pub id: i64,
    pub provider: String,
    pub api_key: String,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProviderKeyRequest {
    pub provider: String,
    pub api_key: String,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub enabled: Option<bool>,
}
