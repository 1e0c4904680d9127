#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use routerag_core::traits::{LanguageModel, Retriever, Tool};
use routerag_core::types::Document;
use routerag_core::{Error, Result};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog { Arc::new(Mutex::new(Vec::new())) }

pub fn events(log: &EventLog) -> Vec<String> { log.lock().unwrap().clone() }

fn record(log: &Option<EventLog>, event: &str) {
    if let Some(log) = log { log.lock().unwrap().push(event.to_string()); }
}

/// Answers classification prompts with `label` and everything else with
/// `answer`, recording every prompt it sees.
#[derive(Default)]
pub struct ScriptedModel {
    pub label: String,
    pub answer: String,
    pub fail_classify: bool,
    pub fail_answers: bool,
    pub delay: Option<Duration>,
    pub log: Option<EventLog>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn labelling(label: &str) -> Self {
        Self { label: label.to_string(), answer: "model answer".to_string(), ..Self::default() }
    }

    pub fn prompts(&self) -> Vec<String> { self.prompts.lock().unwrap().clone() }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        record(&self.log, "model:start");
        if let Some(delay) = self.delay { tokio::time::sleep(delay).await; }
        record(&self.log, "model:end");

        let classifying = prompt.contains("Classify the intent");
        match (classifying, self.fail_classify, self.fail_answers) {
            (true, true, _) | (false, _, true) => Err(Error::Generation("model unavailable".into())),
            (true, false, _) => Ok(self.label.clone()),
            (false, _, false) => Ok(self.answer.clone()),
        }
    }
}

/// Tool with a fixed reply, optional latency and failure.
pub struct StubTool {
    pub name: String,
    pub reply: String,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub log: Option<EventLog>,
    pub inputs: Mutex<Vec<String>>,
}

impl StubTool {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: reply.to_string(),
            fail: false,
            delay: None,
            log: None,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> { self.inputs.lock().unwrap().clone() }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str { &self.name }

    async fn run(&self, input: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(input.to_string());
        record(&self.log, "tool:start");
        if let Some(delay) = self.delay { tokio::time::sleep(delay).await; }
        record(&self.log, "tool:end");
        if self.fail { return Err(Error::tool(&self.name, "lookup refused")); }
        Ok(self.reply.clone())
    }
}

/// Retriever returning fixed documents, or failing.
pub struct FixedRetriever {
    pub documents: Vec<Document>,
    pub fail: bool,
    pub requests: Mutex<Vec<(String, usize)>>,
}

impl FixedRetriever {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            documents: texts.iter().enumerate().map(|(i, t)| Document::new(i.to_string(), *t)).collect(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self { Self { fail: true, ..Self::new(&[]) } }

    pub fn requests(&self) -> Vec<(String, usize)> { self.requests.lock().unwrap().clone() }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>> {
        self.requests.lock().unwrap().push((query.to_string(), top_k));
        if self.fail { return Err(Error::Embedding("embedding backend offline".into())); }
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

pub fn corpus() -> Vec<String> {
    vec![
        "LLM工厂用于解耦多模型调用，是架构的核心。".to_string(),
        "混合搜索结合了稀疏和密集索引，以提高检索准确性。".to_string(),
        "什么是提高RAG准确性的方法？和搜索准确性有关吗？".to_string(),
        "LangGraph是一个强大的工具，用于构建复杂的Agent流程。".to_string(),
    ]
}
