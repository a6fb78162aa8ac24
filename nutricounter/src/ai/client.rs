//! Inference endpoint client
//!
//! Thin client for the generative-language HTTP API behind the
//! estimator, the goal generator and the health coach. One request per
//! call, no retries: failures surface to the caller, which owns the
//! user-facing message. The API key travels only as the request's query
//! parameter and is never logged.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{INFERENCE_BASE_URL, INFERENCE_MODEL, INFERENCE_TIMEOUT_SECS};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One turn in wire format. Role is "user" or "model"; omitted for
/// single-turn prompts and system instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            ..Self::text(text)
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            ..Self::text(text)
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for one inference endpoint and model.
#[derive(Clone)]
pub struct InferenceClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl InferenceClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: INFERENCE_BASE_URL.to_string(),
            model: INFERENCE_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different endpoint. Tests use this to talk
    /// to a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replace the credential used for subsequent requests.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Single-turn generation: one prompt in, generated text out.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.request(GenerateRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: None,
        })
        .await
    }

    /// Multi-turn generation: alternating user/model turns plus a system
    /// instruction, generated text out.
    pub async fn generate_chat(
        &self,
        history: Vec<Content>,
        system_instruction: &str,
    ) -> Result<String> {
        self.request(GenerateRequest {
            contents: history,
            system_instruction: Some(Content::text(system_instruction)),
        })
        .await
    }

    async fn request(&self, request: GenerateRequest) -> Result<String> {
        tracing::debug!("Sending inference request to model {}", self.model);

        let response = self
            .http
            .post(self.url())
            .timeout(Duration::from_secs(INFERENCE_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Inference endpoint returned status {}", status);
            return Err(AppError::Inference {
                status: status.as_u16(),
                detail,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ParseResponse(format!("malformed response envelope: {}", e)))?;

        let text = body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| {
                AppError::ParseResponse("no generated text in response".to_string())
            })?;

        tracing::debug!("Received {} bytes of generated text", text.len());
        Ok(text)
    }
}
