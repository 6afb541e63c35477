use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::Message;

/// OpenAI-compatible chat-completion client. Every supported provider
/// (DeepSeek, OpenAI, Tongyi, Groq, Moonshot, Doubao, Wenxin) speaks this
/// wire format; only endpoint, model and pricing differ.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Reply content plus the token usage the provider reported
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

impl ChatClient {
    pub fn new(api_key: &str, endpoint: &str, model: &str) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 4096,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion and return content + usage
    pub async fn chat(&self, messages: Vec<Message>) -> Result<ChatReply, String> {
        let api_messages: Vec<WireMessage> = messages
            .into_iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content,
            })
            .collect();

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: api_messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        log::debug!(
            "[CHAT] Sending request to {} with model {}",
            self.endpoint,
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Chat API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(format!(
                    "Chat API error ({}): {}",
                    status, error_response.error.message
                ));
            }

            return Err(format!(
                "Chat API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read chat response: {}", e))?;

        let response_data: CompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| format!("Failed to parse chat response: {} - body: {}", e, response_text))?;

        let choice = response_data
            .choices
            .first()
            .ok_or_else(|| "Chat API returned no choices".to_string())?;

        let content = choice.message.content.clone().unwrap_or_default();
        let usage = response_data.usage.unwrap_or_default();

        log::debug!(
            "[CHAT] Response - content_len: {}, prompt_tokens: {}, completion_tokens: {}",
            content.len(),
            usage.prompt_tokens,
            usage.completion_tokens
        );

        Ok(ChatReply {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}
