//! The assistant orchestrator: retrieval, prompt assembly, and generation.
//!
//! An [`Assistant`] is constructed explicitly at startup and injected into
//! the request handlers through axum state. Construction failures surface as
//! typed errors; the service then runs with no assistant and reports
//! `not initialized` on the health endpoint.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use kisaan_genai::GenAiClient;
use kisaan_rag::{load_pdf_dir, reduce_metadata, RagError, RagPipeline};

/// Fixed persona and answering rules; the retrieved context is appended.
const SYSTEM_PROMPT: &str = "You are a Farmer's Assistant chatbot for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, say that you don't know. \
Use three to four sentences maximum and keep the answer concise. \
Always be helpful and provide practical farming advice.";

/// The only error-recovery behavior on the chat path: any failure becomes
/// this fixed apology.
const APOLOGY: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

/// A text-generation backend.
///
/// Seam between the assistant and the hosted model so tests can substitute
/// a deterministic generator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a system instruction and one user turn.
    async fn generate(&self, system_instruction: &str, user_message: &str)
        -> kisaan_genai::Result<String>;
}

#[async_trait]
impl Generator for GenAiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        user_message: &str,
    ) -> kisaan_genai::Result<String> {
        GenAiClient::generate(self, system_instruction, user_message).await
    }
}

/// Errors from assistant operations.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// A retrieval-pipeline failure (embedding, index, ingestion).
    #[error(transparent)]
    Rag(#[from] RagError),

    /// A generation failure from the hosted model.
    #[error(transparent)]
    GenAi(#[from] kisaan_genai::GenAiError),
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Copy)]
pub struct IndexSummary {
    /// Number of page documents loaded.
    pub documents: usize,
    /// Number of chunks embedded and upserted.
    pub chunks: usize,
}

/// The RAG orchestrator behind the chat and index endpoints.
pub struct Assistant {
    pipeline: RagPipeline,
    generator: Arc<dyn Generator>,
    index_name: String,
}

impl Assistant {
    /// Create an assistant over an already-built pipeline and generator.
    pub fn new(pipeline: RagPipeline, generator: Arc<dyn Generator>, index_name: String) -> Self {
        Self { pipeline, generator, index_name }
    }

    /// Answer a user question, grounding the reply in retrieved passages.
    ///
    /// Never fails: any retrieval or generation error is logged and replaced
    /// by a fixed apology string.
    pub async fn answer(&self, question: &str) -> String {
        match self.answer_inner(question).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "failed to answer question");
                APOLOGY.to_string()
            }
        }
    }

    async fn answer_inner(&self, question: &str) -> Result<String, AssistantError> {
        let results = self.pipeline.retrieve(&self.index_name, question).await?;

        let context: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        let system_instruction = format!("{SYSTEM_PROMPT}\n\n{}", context.join("\n\n"));

        let reply = self.generator.generate(&system_instruction, question).await?;
        Ok(reply)
    }

    /// Load, reduce, chunk, embed, and upsert every PDF under `data_path`.
    ///
    /// Runs synchronously within the calling request; there is no queue,
    /// progress reporting, or cancellation. Returns how much was indexed.
    pub async fn index_directory(&self, data_path: &Path) -> Result<IndexSummary, AssistantError> {
        let documents: Vec<_> =
            load_pdf_dir(data_path).into_iter().map(reduce_metadata).collect();
        if documents.is_empty() {
            return Ok(IndexSummary { documents: 0, chunks: 0 });
        }

        let chunks = self.pipeline.ingest_batch(&self.index_name, &documents).await?;
        info!(
            path = %data_path.display(),
            documents = documents.len(),
            chunks = chunks.len(),
            "indexed data directory"
        );

        Ok(IndexSummary { documents: documents.len(), chunks: chunks.len() })
    }
}
