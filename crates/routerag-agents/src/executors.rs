//! Executors run one routed task each and never fail: port and parsing
//! errors come back as text in [`ExecutorReply::output`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use routerag_core::deadline::bounded;
use routerag_core::traits::{LanguageModel, Retriever, Tool};
use routerag_core::types::Document;
use routerag_core::Error;

use crate::calculator::extract_expression;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorReply {
    pub output: String,
    /// What the answer was based on: the tool result or the retrieved context.
    pub evidence: Option<String>,
}

#[async_trait]
pub trait Executor: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, query: &str) -> ExecutorReply;
}

pub struct CalculatorExecutor {
    tool: Arc<dyn Tool>,
    model: Arc<dyn LanguageModel>,
    polish: bool,
    tool_timeout: Option<Duration>,
    generation_timeout: Option<Duration>,
}

impl CalculatorExecutor {
    pub fn new(tool: Arc<dyn Tool>, model: Arc<dyn LanguageModel>) -> Self {
        Self { tool, model, polish: true, tool_timeout: None, generation_timeout: None }
    }

    /// Whether the numeric result is rephrased by the language model.
    pub fn with_polish(mut self, polish: bool) -> Self {
        self.polish = polish;
        self
    }

    pub fn with_timeouts(mut self, tool: Option<Duration>, generation: Option<Duration>) -> Self {
        self.tool_timeout = tool;
        self.generation_timeout = generation;
        self
    }

    async fn compute(&self, expression: &str) -> Result<String, Error> {
        if expression.is_empty() {
            return Err(Error::ExpressionParse("no arithmetic expression found".into()));
        }
        let call = format!("tool '{}'", self.tool.name());
        bounded(&call, self.tool_timeout, self.tool.run(expression)).await
    }
}

#[async_trait]
impl Executor for CalculatorExecutor {
    fn name(&self) -> &str { "calculator" }

    async fn execute(&self, query: &str) -> ExecutorReply {
        let expression = extract_expression(query);
        debug!(expression = %expression, "calculator expression");

        let raw = match self.compute(&expression).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "calculation failed");
                return ExecutorReply { output: format!("Cannot calculate '{query}': {e}"), evidence: None };
            }
        };
        info!(expression = %expression, result = %raw, "calculated");

        if !self.polish {
            return ExecutorReply { output: raw.clone(), evidence: Some(raw) };
        }
        let prompt = format!(
            "Question: {query}\nTool result: {raw}\nAnswer the question briefly using the tool result."
        );
        match bounded("generate", self.generation_timeout, self.model.generate(&prompt)).await {
            Ok(sentence) => ExecutorReply { output: sentence, evidence: Some(raw) },
            Err(e) => {
                warn!(error = %e, "polishing the result failed, returning it as is");
                ExecutorReply { output: raw.clone(), evidence: Some(raw) }
            }
        }
    }
}

pub const DEFAULT_KNOWLEDGE_TOP_K: usize = 2;

pub struct KnowledgeExecutor {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
    generation_timeout: Option<Duration>,
}

impl KnowledgeExecutor {
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn LanguageModel>) -> Self {
        Self { retriever, model, top_k: DEFAULT_KNOWLEDGE_TOP_K, generation_timeout: None }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_generation_timeout(mut self, limit: Option<Duration>) -> Self {
        self.generation_timeout = limit;
        self
    }
}

#[async_trait]
impl Executor for KnowledgeExecutor {
    fn name(&self) -> &str { "knowledge" }

    async fn execute(&self, query: &str) -> ExecutorReply {
        let documents = match self.retriever.search(query, self.top_k).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "retrieval failed");
                return ExecutorReply { output: format!("Knowledge lookup failed: {e}"), evidence: None };
            }
        };
        info!(retrieved = documents.len(), top_k = self.top_k, "retrieved context");

        let context = format_context(&documents);
        let prompt = knowledge_prompt(query, &context);
        match bounded("generate", self.generation_timeout, self.model.generate(&prompt)).await {
            Ok(answer) => ExecutorReply { output: answer, evidence: Some(context) },
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                ExecutorReply { output: format!("Knowledge answer failed: {e}"), evidence: Some(context) }
            }
        }
    }
}

/// Renders documents as numbered blocks; empty input gives an empty string.
pub fn format_context(documents: &[Document]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("--- result {} ---\n{}", i + 1, doc.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn knowledge_prompt(query: &str, context: &str) -> String {
    format!(
        "Answer the question using only the context below. \
         If the context does not contain the answer, say so.\n\
         Question: {query}\n\
         Context:\n{context}"
    )
}
