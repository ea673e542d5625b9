//! Startup configuration: CLI arguments and required environment secrets.

use clap::Parser;
use thiserror::Error;

/// Command-line arguments for the server.
#[derive(Debug, Parser)]
#[command(name = "kisaan-server", about = "Kisaan Sahayak farming assistant API server")]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "KISAAN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "KISAAN_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Name of the Pinecone index holding the document embeddings.
    #[arg(long, env = "KISAAN_INDEX", default_value = "general-query")]
    pub index_name: String,
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("{0} not found in environment variables")]
    MissingKey(&'static str),
}

/// Secrets read from the environment, validated once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the Pinecone vector index.
    pub pinecone_api_key: String,
    /// API key for the Gemini generation API.
    pub genai_api_key: String,
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).ok().filter(|v| !v.is_empty()).ok_or(ConfigError::MissingKey(key))
}

impl AppConfig {
    /// Read and validate all required keys, failing with a specific
    /// missing-key error for the first absent field.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pinecone_api_key: require("PINECONE_API_KEY")?,
            genai_api_key: require("GENAI_API_KEY")?,
        })
    }
}
