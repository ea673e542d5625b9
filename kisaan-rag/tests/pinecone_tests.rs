//! Control-plane tests for the Pinecone store against a local stub server.
#![cfg(feature = "pinecone")]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use kisaan_rag::{PineconeVectorStore, VectorStore};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

#[tokio::test]
async fn ensure_index_is_a_noop_for_an_existing_index() {
    let router = Router::new().route(
        "/indexes/{name}",
        get(|Path(name): Path<String>| async move {
            Json(json!({"name": name, "host": "example-host.pinecone.io"}))
        }),
    );
    let base = spawn_stub(router).await;

    let store = PineconeVectorStore::new("pc-test-key").unwrap().with_controller_url(base);
    store.ensure_index("general-query", 384).await.unwrap();
}

/// Captures the index-creation request body the store sent.
#[derive(Clone, Default)]
struct Created(Arc<Mutex<Option<Value>>>);

#[tokio::test]
async fn ensure_index_creates_a_missing_index_with_the_configured_placement() {
    let created = Created::default();
    let router = Router::new()
        .route(
            "/indexes/{name}",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": {"message": "Resource general-query not found"}})),
                )
            }),
        )
        .route(
            "/indexes",
            post(|State(created): State<Created>, Json(body): Json<Value>| async move {
                *created.0.lock().unwrap() = Some(body);
                Json(json!({"name": "general-query", "host": "example-host.pinecone.io"}))
            }),
        )
        .with_state(created.clone());
    let base = spawn_stub(router).await;

    let store = PineconeVectorStore::new("pc-test-key")
        .unwrap()
        .with_controller_url(base)
        .with_placement("gcp", "europe-west4");
    store.ensure_index("general-query", 384).await.unwrap();

    let body = created.0.lock().unwrap().clone().unwrap();
    assert_eq!(body["name"], "general-query");
    assert_eq!(body["dimension"], 384);
    assert_eq!(body["metric"], "cosine");
    assert_eq!(body["spec"]["serverless"]["cloud"], "gcp");
    assert_eq!(body["spec"]["serverless"]["region"], "europe-west4");
}

#[tokio::test]
async fn control_plane_errors_carry_the_api_message() {
    let router = Router::new().route(
        "/indexes/{name}",
        get(|| async {
            (StatusCode::UNAUTHORIZED, Json(json!({"error": {"message": "Invalid API key"}})))
        }),
    );
    let base = spawn_stub(router).await;

    let store = PineconeVectorStore::new("bad-key").unwrap().with_controller_url(base);
    let err = store.ensure_index("general-query", 384).await.unwrap_err();
    assert!(err.to_string().contains("Invalid API key"));
}
