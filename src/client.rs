//! Inference endpoint client
//!
//! Thin async wrapper around the tutor's HTTP API: two chat endpoints (one
//! per model checkpoint) and a health probe. The client performs no retries;
//! an upstream failure is surfaced as a [`ClientError`] for the caller to
//! present.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::ModelChoice;

pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl ChatRequest {
    /// A request with the default generation parameters.
    pub fn new(message: impl Into<String>) -> Self {
        ChatRequest {
            message: message.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Chat response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The model's full answer text.
    pub response: String,
    /// Identifier of the checkpoint that produced it.
    pub model_used: String,
}

/// Upstream failure classes.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    Build { message: String },
    /// Transport-level failure (connect, timeout, protocol).
    Network { message: String },
    /// The endpoint answered with a non-success status.
    Status { code: u16, body: String },
    /// The response body was not the expected JSON shape.
    Decode { message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Build { message } => write!(f, "client setup failed: {}", message),
            ClientError::Network { message } => write!(f, "{}", message),
            ClientError::Status { code, body } => {
                if body.is_empty() {
                    write!(f, "API error: HTTP {}", code)
                } else {
                    write!(f, "API error: HTTP {}: {}", code, body)
                }
            }
            ClientError::Decode { message } => {
                write!(f, "failed to parse API response: {}", message)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout - the API took too long to respond".to_string()
        } else if err.is_connect() {
            "connection error - unable to reach the API".to_string()
        } else {
            format!("network error: {}", err)
        };
        ClientError::Network { message }
    }
}

/// Client for one solver deployment.
#[derive(Debug, Clone)]
pub struct SolverClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl SolverClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Build {
                message: err.to_string(),
            })?;
        Ok(SolverClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        })
    }

    /// Probe the deployment's health endpoint. Errors map to `false`.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Submit a problem to the chosen model checkpoint with default
    /// generation parameters.
    pub async fn solve(
        &self,
        message: impl Into<String>,
        model: ModelChoice,
    ) -> Result<ChatResponse, ClientError> {
        self.chat(model.endpoint(), ChatRequest::new(message)).await
    }

    /// Send a fully specified chat request to an endpoint path.
    pub async fn chat(
        &self,
        endpoint: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .http
            .post(url)
            .header("X-API-Key", self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                code: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|err| ClientError::Decode {
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_the_api_contract() {
        let request = ChatRequest::new("solve x^2 = 4");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.top_p, 0.9);

        let body = serde_json::to_value(&request).expect("request serializes");
        assert_eq!(body["message"], "solve x^2 = 4");
        assert_eq!(body["max_tokens"], 512);
    }

    #[test]
    fn response_deserializes_from_the_wire_shape() {
        let body = r#"{"response": "x = 2", "model_used": "qwen2.5-spin-iter3"}"#;
        let response: ChatResponse = serde_json::from_str(body).expect("response parses");
        assert_eq!(response.response, "x = 2");
        assert_eq!(response.model_used, "qwen2.5-spin-iter3");
    }

    #[test]
    fn status_error_display_includes_code_and_body() {
        let err = ClientError::Status {
            code: 429,
            body: "rate limited".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("rate limited"));
    }

    #[test]
    fn base_url_is_normalized() {
        let client = SolverClient::new("http://localhost:8000/", "key").expect("client builds");
        assert!(client.base_url.ends_with("8000"));
    }
}
