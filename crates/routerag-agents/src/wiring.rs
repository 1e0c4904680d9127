//! Builds the full object graph bottom-up: embedding model, retrieval engine,
//! executors, router. Every missing dependency is reported before anything
//! serves a request.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use routerag_core::config::Settings;
use routerag_core::traits::{EmbeddingModel, LanguageModel, Retriever, Tool};
use routerag_core::{Error, Result};
use routerag_hybrid::RetrievalEngine;

use crate::executors::{CalculatorExecutor, KnowledgeExecutor};
use crate::router::{Router, CALC_EXECUTOR, RAG_EXECUTOR};

/// Externally supplied capabilities.
pub struct Components {
    pub language_model: Arc<dyn LanguageModel>,
    pub embedding_model: Arc<dyn EmbeddingModel>,
    pub tools: Vec<Arc<dyn Tool>>,
}

pub struct Assembly {
    pub router: Router,
    /// Shared with the knowledge executor; ingest through this handle.
    pub engine: Arc<RetrievalEngine>,
}

pub fn assemble(components: Components, settings: &Settings) -> Result<Assembly> {
    settings.validate()?;
    let Components { language_model, embedding_model, tools } = components;

    let mut by_name: HashMap<String, Arc<dyn Tool>> = HashMap::new();
    for tool in tools {
        let name = tool.name().to_string();
        if by_name.insert(name.clone(), tool).is_some() {
            return Err(Error::Configuration(format!("tool '{name}' is registered twice")));
        }
    }
    let lookup = |name: &str, role: &str| {
        by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Configuration(format!("{role} tool '{name}' is not registered")))
    };

    let calculator_tool = lookup(&settings.executors.calculator_tool, "calculator")?;
    let aux_tool = settings.router.aux_tool.as_deref().map(|name| lookup(name, "auxiliary")).transpose()?;

    let engine = Arc::new(
        RetrievalEngine::new(embedding_model, settings.retrieval.clone())?
            .with_embedding_timeout(settings.executors.embedding_timeout()),
    );

    let calculator = CalculatorExecutor::new(calculator_tool, Arc::clone(&language_model))
        .with_polish(settings.executors.polish_calculations)
        .with_timeouts(settings.executors.tool_timeout(), settings.executors.generation_timeout());
    let retriever: Arc<dyn Retriever> = engine.clone();
    let knowledge = KnowledgeExecutor::new(retriever, Arc::clone(&language_model))
        .with_top_k(settings.executors.knowledge_top_k)
        .with_generation_timeout(settings.executors.generation_timeout());

    let router = Router::builder(language_model)
        .settings(settings.router.clone())
        .executor(CALC_EXECUTOR, Arc::new(calculator))
        .executor(RAG_EXECUTOR, Arc::new(knowledge))
        .aux_tool(aux_tool)
        .build()?;
    info!(tools = by_name.len(), "components assembled");
    Ok(Assembly { router, engine })
}
