use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of asking one provider one question and counting brand mentions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub id: String,
    pub brand: String,
    pub keyword: String,
    pub provider: String,
    pub question: String,
    pub mentioned: bool,
    pub mention_count: i64,
    /// Context window around the first mention, if any
    pub excerpt: Option<String>,
    /// Set when the provider call failed; such rows are excluded from the
    /// mention-rate denominator
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One day of verification outcomes for one provider. `checked` excludes
/// errored rows; `mention_rate` is `mentioned / checked` (0 when nothing
/// was checked).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRatePoint {
    /// Calendar day, `YYYY-MM-DD`
    pub day: String,
    pub provider: String,
    pub checked: i64,
    pub mentioned: i64,
    pub errors: i64,
    pub mention_rate: f64,
}

/// Cost-log row for a single chat-completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCall {
    pub id: String,
    pub provider: String,
    pub model: String,
    /// What the call was for: generate / score / expand / verify / ...
    pub operation: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cost_usd: f64,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated cost report over a date range
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CostSummary {
    pub total_calls: i64,
    pub failed_calls: i64,
    pub total_prompt_tokens: i64,
    pub total_completion_tokens: i64,
    pub total_cost_usd: f64,
    pub by_provider: Vec<ProviderCost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCost {
    pub provider: String,
    pub calls: i64,
    pub failed: i64,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub cost_usd: f64,
}
