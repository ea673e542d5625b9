//! Minimal Google Gemini client for the Kisaan Sahayak farming assistant.
//!
//! One endpoint, one call shape: [`GenAiClient::generate`] posts a system
//! instruction and a single user turn to `generateContent` and returns the
//! first candidate's text.

pub mod client;
pub mod error;

pub use client::GenAiClient;
pub use error::{GenAiError, Result};
