//! Minimal Gemini `generateContent` client.
//!
//! Covers exactly what the assistant needs: send a system instruction plus a
//! single user turn, get the text of the first candidate back. No streaming,
//! no tool calls, no Vertex AI.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{GenAiError, Result};

/// The Generative Language API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default generation model.
const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// A client for the Gemini `generateContent` endpoint.
///
/// # Configuration
///
/// - `model` – defaults to `gemini-2.5-pro`.
/// - `api_key` – from the constructor; the server reads it from `GENAI_API_KEY`.
///
/// # Example
///
/// ```rust,ignore
/// use kisaan_genai::GenAiClient;
///
/// let client = GenAiClient::new("AIza...")?;
/// let answer = client.generate("You are a farming assistant.", "When do I sow wheat?").await?;
/// ```
pub struct GenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GenAiClient {
    /// Create a new client with the given API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(GenAiError::ConfigError("API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
        })
    }

    /// Set the model name (e.g. `gemini-2.5-flash`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (for tests against a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate a completion for a system instruction and one user turn.
    ///
    /// Returns the concatenated text parts of the first candidate.
    ///
    /// # Errors
    ///
    /// - [`GenAiError::RequestError`] if the HTTP call fails
    /// - [`GenAiError::ApiError`] on a non-success status
    /// - [`GenAiError::EmptyResponse`] if no candidate text comes back
    pub async fn generate(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request_body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system_instruction.to_string() }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: user_message.to_string() }],
            }],
        };

        debug!(model = %self.model, user_len = user_message.len(), "generating content");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "generation request failed");
                GenAiError::RequestError(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(model = %self.model, status, "generation API error");
            return Err(GenAiError::ApiError { status, message });
        }

        let generation: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::ParseError(format!("failed to parse response: {e}")))?;

        let text = generation.text();
        if text.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(text)
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, or empty.
    pub(crate) fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Response parsing tests ──────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_simple_text_response() {
        let json = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "Rotate legumes with cereals."}],
                    "role": "model"
                },
                "finishReason": "STOP",
                "index": 0
            }],
            "usageMetadata": {
                "promptTokenCount": 42,
                "candidatesTokenCount": 7,
                "totalTokenCount": 49
            },
            "modelVersion": "gemini-2.5-pro"
        });

        let resp: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.text(), "Rotate legumes with cereals.");
    }

    #[test]
    fn parse_multi_part_response_concatenates() {
        let json = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "Part one. "}, {"text": "Part two."}],
                    "role": "model"
                }
            }]
        });

        let resp: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.text(), "Part one. Part two.");
    }

    #[test]
    fn parse_multi_candidate_uses_first() {
        let json = json!({
            "candidates": [
                {"content": {"parts": [{"text": "Answer A"}], "role": "model"}},
                {"content": {"parts": [{"text": "Answer B"}], "role": "model"}}
            ]
        });

        let resp: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert_eq!(resp.text(), "Answer A");
    }

    #[test]
    fn parse_blocked_response_yields_empty_text() {
        // A safety-blocked prompt returns no candidates.
        let json = json!({
            "promptFeedback": {
                "blockReason": "SAFETY"
            }
        });

        let resp: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert!(resp.text().is_empty());
    }

    #[test]
    fn parse_candidate_without_content() {
        // MAX_TOKENS can produce a candidate with no content field.
        let json = json!({
            "candidates": [{"finishReason": "MAX_TOKENS", "index": 0}]
        });

        let resp: GenerateContentResponse = serde_json::from_value(json).unwrap();
        assert!(resp.text().is_empty());
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "persona".into() }],
            },
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: "question".into() }],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("systemInstruction").is_some());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "question");
        // No role key is emitted for the system instruction.
        assert!(value["systemInstruction"].get("role").is_none());
    }
}
