//! Retrieval pipeline for the Kisaan Sahayak farming assistant.
//!
//! This crate provides the full write and read path of the RAG system:
//!
//! - [`loader`] — per-page PDF loading and metadata reduction
//! - [`chunking`] — recursive splitting into bounded, overlapping chunks
//! - [`embedding`] / [`minilm`] — sentence embeddings (local MiniLM, 384-dim)
//! - [`vectorstore`] / [`pinecone`] / [`inmemory`] — cosine similarity search
//! - [`pipeline`] — the orchestrator tying the stages together
//!
//! Write path: load → reduce → chunk → embed → upsert.
//! Read path: embed query → top-k similarity query.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod loader;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "minilm")]
pub mod minilm;

#[cfg(feature = "pinecone")]
pub mod pinecone;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use loader::{load_pdf_dir, reduce_metadata};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use vectorstore::VectorStore;

#[cfg(feature = "minilm")]
pub use minilm::MiniLmEmbedder;

#[cfg(feature = "pinecone")]
pub use pinecone::PineconeVectorStore;
