//! Capability ports consumed by the router and the retrieval engine.
//!
//! Backends are opaque: a language model turns a prompt into text, an
//! embedding model turns text into fixed-length vectors, a tool turns text
//! into text. Every call may suspend for an arbitrary time; callers bound them
//! with [`crate::deadline::bounded`].

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Document;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embeds a batch. The output has the same length and order as `texts`.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, input: &str) -> Result<String>;
}

/// Read side of a document index, as seen by executors.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>>;
}
