//! Binary entry point for the Kisaan Sahayak API server.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kisaan_genai::GenAiClient;
use kisaan_rag::{
    MiniLmEmbedder, PineconeVectorStore, RagConfig, RagPipeline, RecursiveChunker,
};
use kisaan_server::{create_router, AppConfig, AppState, Assistant, Cli};

/// Build the production assistant: local MiniLM embeddings, a Pinecone
/// serverless index, and the Gemini generation client.
async fn init_assistant(cli: &Cli) -> anyhow::Result<Assistant> {
    let config = AppConfig::from_env()?;

    let embedder = MiniLmEmbedder::load().await.context("loading embedding model")?;
    let store =
        PineconeVectorStore::new(&config.pinecone_api_key).context("creating Pinecone client")?;

    let rag_config = RagConfig::default();
    let chunker = RecursiveChunker::new(rag_config.chunk_size, rag_config.chunk_overlap);

    let pipeline = RagPipeline::builder()
        .config(rag_config)
        .embedding_provider(Arc::new(embedder))
        .vector_store(Arc::new(store))
        .chunker(Arc::new(chunker))
        .build()
        .context("building RAG pipeline")?;

    pipeline.ensure_index(&cli.index_name).await.context("ensuring Pinecone index")?;

    let generator = GenAiClient::new(&config.genai_api_key).context("creating Gemini client")?;

    Ok(Assistant::new(pipeline, Arc::new(generator), cli.index_name.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let assistant = match init_assistant(&cli).await {
        Ok(assistant) => Some(Arc::new(assistant)),
        Err(e) => {
            // Serve anyway so the health endpoint can report the failure.
            error!(error = %format!("{e:#}"), "failed to initialize RAG system");
            None
        }
    };

    let app = create_router(AppState { assistant });

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("binding {}:{}", cli.host, cli.port))?;
    info!(host = %cli.host, port = cli.port, "Kisaan Sahayak API server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
