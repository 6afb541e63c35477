pub mod chat;
pub mod extract;
pub mod providers;
pub mod retry;

pub use chat::{ChatClient, ChatReply};
pub use providers::ProviderId;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::ApiCall;
use crate::storage::DataStorage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl ToString for MessageRole {
    fn to_string(&self) -> String {
        match self {
            MessageRole::System => "system".to_string(),
            MessageRole::User => "user".to_string(),
            MessageRole::Assistant => "assistant".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Provider client bound to the cost log. Domain code goes through
/// `ChatService::chat`, which applies the bounded retry policy and records
/// an `ApiCall` row for every call chain, success or failure.
#[derive(Clone)]
pub struct ChatService {
    client: ChatClient,
    provider: ProviderId,
    storage: Arc<DataStorage>,
}

impl ChatService {
    pub fn new(client: ChatClient, provider: ProviderId, storage: Arc<DataStorage>) -> Self {
        Self {
            client,
            provider,
            storage,
        }
    }

    /// Build a service for the given provider (or the configured active one)
    /// from stored settings. Returns `Ok(None)` when no enabled API key is
    /// configured; callers then fall back to rule-based heuristics.
    pub fn from_storage(
        storage: &Arc<DataStorage>,
        provider: Option<ProviderId>,
    ) -> Result<Option<ChatService>, String> {
        let settings = storage.get_app_settings()?;
        let provider = match provider.or_else(|| ProviderId::from_str(&settings.active_provider)) {
            Some(p) => p,
            None => {
                return Err(format!(
                    "Unknown provider in settings: {}",
                    settings.active_provider
                ))
            }
        };

        let key = match storage.get_provider_key(provider.as_str())? {
            Some(k) if k.enabled && !k.api_key.is_empty() => k,
            _ => {
                log::debug!(
                    "[AI] No enabled API key for provider {}, using heuristic fallbacks",
                    provider.as_str()
                );
                return Ok(None);
            }
        };

        let endpoint = key
            .endpoint
            .clone()
            .unwrap_or_else(|| provider.endpoint().to_string());
        let model = key
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());

        let client = ChatClient::new(&key.api_key, &endpoint, &model)?;
        Ok(Some(ChatService::new(client, provider, storage.clone())))
    }

    /// One service per enabled provider key, in provider order. Keys for
    /// unknown providers are skipped with a warning.
    pub fn all_enabled(storage: &Arc<DataStorage>) -> Result<Vec<ChatService>, String> {
        let mut services = Vec::new();
        for key in storage.list_provider_keys()? {
            if !key.enabled || key.api_key.is_empty() {
                continue;
            }
            let provider = match ProviderId::from_str(&key.provider) {
                Some(p) => p,
                None => {
                    log::warn!("[AI] Skipping key for unknown provider {}", key.provider);
                    continue;
                }
            };
            let endpoint = key
                .endpoint
                .unwrap_or_else(|| provider.endpoint().to_string());
            let model = key
                .model
                .unwrap_or_else(|| provider.default_model().to_string());
            let client = ChatClient::new(&key.api_key, &endpoint, &model)?;
            services.push(ChatService::new(client, provider, storage.clone()));
        }
        Ok(services)
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Send a chat completion with bounded retry, logging cost either way.
    /// `operation` tags the cost-log row (generate / score / expand / ...).
    pub async fn chat(&self, operation: &str, messages: Vec<Message>) -> Result<String, String> {
        let mut last_error = String::new();

        for attempt in 0..=retry::MAX_RETRIES {
            if attempt > 0 {
                let delay = retry::backoff_delay(attempt);
                log::warn!(
                    "[AI] Retry {}/{} for {} after {:?}: {}",
                    attempt,
                    retry::MAX_RETRIES,
                    operation,
                    delay,
                    last_error
                );
                tokio::time::sleep(delay).await;
            }

            match self.client.chat(messages.clone()).await {
                Ok(reply) => {
                    self.log_call(operation, &reply, true, None);
                    return Ok(reply.content);
                }
                Err(e) => {
                    if !retry::is_retryable_error(&e) {
                        self.log_failure(operation, &e);
                        return Err(e);
                    }
                    last_error = e;
                }
            }
        }

        self.log_failure(operation, &last_error);
        Err(last_error)
    }

    fn log_call(&self, operation: &str, reply: &ChatReply, success: bool, error: Option<&str>) {
        let call = ApiCall {
            id: uuid::Uuid::new_v4().to_string(),
            provider: self.provider.as_str().to_string(),
            model: self.client.model().to_string(),
            operation: operation.to_string(),
            prompt_tokens: reply.prompt_tokens,
            completion_tokens: reply.completion_tokens,
            cost_usd: self
                .provider
                .estimate_cost(reply.prompt_tokens, reply.completion_tokens),
            success,
            error: error.map(|e| e.to_string()),
            created_at: Utc::now(),
        };
        if let Err(e) = self.storage.log_api_call(&call) {
            log::warn!("[AI] Failed to record api call: {}", e);
        }
    }

    fn log_failure(&self, operation: &str, error: &str) {
        let reply = ChatReply {
            content: String::new(),
            prompt_tokens: 0,
            completion_tokens: 0,
        };
        self.log_call(operation, &reply, false, Some(error));
    }
}
