//! Error types for the `kisaan-genai` crate.

use thiserror::Error;

/// Errors that can occur when calling the Gemini API.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// The client was constructed with invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The HTTP request could not be performed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code returned by the API.
        status: u16,
        /// The API's error message, or the raw body if unparseable.
        message: String,
    },

    /// The response body could not be deserialized.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The API returned no usable candidate text.
    #[error("empty response: no candidate text returned")]
    EmptyResponse,
}

/// A convenience result type for generation operations.
pub type Result<T> = std::result::Result<T, GenAiError>;
