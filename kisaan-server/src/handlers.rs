//! Request handlers for the chat, health, info, and index-data endpoints.

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

/// Default directory scanned by `/api/index-data` when none is given.
const DEFAULT_DATA_PATH: &str = "data";

const UNAVAILABLE: &str =
    "Sorry, the AI system is currently unavailable. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rag_system: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct IndexDataRequest {
    #[serde(default)]
    pub data_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexDataResponse {
    pub message: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IndexDataError {
    pub error: String,
    pub status: &'static str,
}

fn bad_request(error: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ValidationError { error: error.into() })).into_response()
}

/// POST /api/chat
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let Some(message) = req.message else {
        return bad_request("Message is required");
    };

    let message = message.trim();
    if message.is_empty() {
        return bad_request("Message cannot be empty");
    }

    let Some(assistant) = &state.assistant else {
        warn!("chat request while RAG system is not initialized");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse { reply: UNAVAILABLE.to_string(), status: "error" }),
        )
            .into_response();
    };

    let reply = assistant.answer(message).await;
    (StatusCode::OK, Json(ChatResponse { reply, status: "success" })).into_response()
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        rag_system: if state.assistant.is_some() { "initialized" } else { "not initialized" },
    })
}

/// GET /api/info
pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Kisaan Sahayak - Farmer's AI Assistant",
        description: "An end-to-end Farmer's AI assistant to solve all queries related to \
                      agriculture and farming practices in INDIA.",
        capabilities: &[
            "Crop recommendations",
            "Fertilizer guidance",
            "Pest management",
            "Weather-based advice",
            "Organic farming practices",
            "Soil management",
        ],
    })
}

/// POST /api/index-data
///
/// Re-runs the load → reduce → chunk → embed → upsert path synchronously
/// within the request.
pub async fn index_data(
    State(state): State<AppState>,
    Json(req): Json<IndexDataRequest>,
) -> Response {
    let data_path = req.data_path.unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

    if !Path::new(&data_path).exists() {
        return (
            StatusCode::BAD_REQUEST,
            Json(IndexDataError {
                error: format!("Data path {data_path} does not exist"),
                status: "error",
            }),
        )
            .into_response();
    }

    let Some(assistant) = &state.assistant else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(IndexDataError { error: "RAG system is not initialized".to_string(), status: "error" }),
        )
            .into_response();
    };

    match assistant.index_directory(Path::new(&data_path)).await {
        Ok(summary) if summary.documents == 0 => {
            bad_request_indexing("No documents found to index")
        }
        Ok(summary) => (
            StatusCode::OK,
            Json(IndexDataResponse {
                message: format!(
                    "Successfully indexed {} chunks from {} documents",
                    summary.chunks, summary.documents
                ),
                status: "success",
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "indexing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IndexDataError { error: "Failed to index data".to_string(), status: "error" }),
            )
                .into_response()
        }
    }
}

fn bad_request_indexing(error: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(IndexDataError { error: error.into(), status: "error" }))
        .into_response()
}
