use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Embedding or index construction failed; the previous index pair stays live.
    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },

    #[error("{call} timed out after {}ms", after.as_millis())]
    Timeout { call: String, after: Duration },

    #[error("Cannot parse expression: {0}")]
    ExpressionParse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }

    /// True for failures of an external capability (model, embedder, tool),
    /// which executors recover from by reporting them as text.
    pub fn is_port_failure(&self) -> bool {
        matches!(self, Self::Generation(_) | Self::Embedding(_) | Self::Tool { .. } | Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
