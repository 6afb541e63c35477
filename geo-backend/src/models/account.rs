use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored credentials for a publishing platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformAccount {
    pub id: String,
    pub platform: String,
    pub username: String,
    pub credential: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Record of an article queued for publishing. No outbound integration:
/// rows are created in "pending" state and left there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRecord {
    pub id: String,
    pub article_id: String,
    pub platform: String,
    pub url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PublishRecord {
    pub fn pending(article_id: &str, platform: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            article_id: article_id.to_string(),
            platform: platform.to_string(),
            url: None,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }
}
