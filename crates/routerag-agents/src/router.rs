//! Intent router.
//!
//! One request walks a fixed graph: `Route` classifies the input with the
//! language model (while the optional auxiliary tool runs alongside), then
//! `Execute` hands the input to the executor registered for the decision, or
//! finishes directly for [`RouteDecision::Default`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use routerag_core::config::RouterSettings;
use routerag_core::deadline::bounded;
use routerag_core::traits::{LanguageModel, Tool};
use routerag_core::{Error, Result};

use crate::executors::Executor;

/// Registry key of the calculator executor.
pub const CALC_EXECUTOR: &str = "calc_executor";
/// Registry key of the knowledge executor.
pub const RAG_EXECUTOR: &str = "rag_executor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDecision {
    Calculator,
    Knowledge,
    Default,
}

impl RouteDecision {
    /// Reads a free-form model response. Containment is checked after
    /// uppercasing, `CALCULATOR` before `KNOWLEDGE`/`RAG`, so a response naming
    /// both labels routes to the calculator.
    pub fn from_response(response: &str) -> Self {
        let normalized = response.trim().to_uppercase();
        if normalized.contains("CALCULATOR") {
            Self::Calculator
        } else if normalized.contains("KNOWLEDGE") || normalized.contains("RAG") {
            Self::Knowledge
        } else {
            Self::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculator => "CALCULATOR",
            Self::Knowledge => "KNOWLEDGE",
            Self::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Per-request state, owned by the router until the request finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingContext {
    pub input: String,
    pub decision: Option<RouteDecision>,
    pub aux_result: Option<String>,
    pub output: String,
    pub evidence: Option<String>,
}

impl RoutingContext {
    fn new(input: &str) -> Self {
        Self { input: input.to_string(), decision: None, aux_result: None, output: String::new(), evidence: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub output: String,
    pub decision: RouteDecision,
}

enum Step {
    Route,
    Execute(RouteDecision),
    Done,
}

/// The fixed decision-to-executor mapping. `Default` has no executor.
struct ExecutorRegistry {
    calculator: Arc<dyn Executor>,
    knowledge: Arc<dyn Executor>,
}

impl ExecutorRegistry {
    fn for_decision(&self, decision: RouteDecision) -> Option<&Arc<dyn Executor>> {
        match decision {
            RouteDecision::Calculator => Some(&self.calculator),
            RouteDecision::Knowledge => Some(&self.knowledge),
            RouteDecision::Default => None,
        }
    }
}

pub struct Router {
    model: Arc<dyn LanguageModel>,
    aux_tool: Option<Arc<dyn Tool>>,
    executors: ExecutorRegistry,
    settings: RouterSettings,
}

impl Router {
    pub fn builder(model: Arc<dyn LanguageModel>) -> RouterBuilder { RouterBuilder::new(model) }

    pub async fn handle(&self, query: &str) -> RouteOutcome {
        let ctx = self.process(query).await;
        RouteOutcome { output: ctx.output, decision: ctx.decision.unwrap_or(RouteDecision::Default) }
    }

    /// Runs the request to completion and returns its full context.
    pub async fn process(&self, query: &str) -> RoutingContext {
        let mut ctx = RoutingContext::new(query);
        let mut step = Step::Route;
        loop {
            step = match step {
                Step::Route => self.route(&mut ctx).await,
                Step::Execute(decision) => {
                    self.execute(decision, &mut ctx).await;
                    Step::Done
                }
                Step::Done => break,
            };
        }
        info!(
            decision = %ctx.decision.unwrap_or(RouteDecision::Default),
            aux = ctx.aux_result.is_some(),
            "request handled"
        );
        ctx
    }

    async fn route(&self, ctx: &mut RoutingContext) -> Step {
        let prompt = classification_prompt(&ctx.input);
        let classify = bounded("classify", self.settings.classify_timeout(), self.model.generate(&prompt));
        let (classified, aux_result) = tokio::join!(classify, self.run_aux(&ctx.input));
        ctx.aux_result = aux_result;

        match classified {
            Ok(response) => {
                let decision = RouteDecision::from_response(&response);
                debug!(response = %response.trim(), %decision, "classified");
                ctx.decision = Some(decision);
                Step::Execute(decision)
            }
            Err(e) => {
                warn!(error = %e, "classification failed");
                ctx.decision = Some(RouteDecision::Default);
                ctx.output = format!("Could not classify the request: {e}");
                Step::Done
            }
        }
    }

    async fn run_aux(&self, input: &str) -> Option<String> {
        let tool = self.aux_tool.as_ref()?;
        let call = format!("tool '{}'", tool.name());
        match bounded(&call, self.settings.aux_timeout(), tool.run(input)).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "auxiliary tool call dropped");
                None
            }
        }
    }

    async fn execute(&self, decision: RouteDecision, ctx: &mut RoutingContext) {
        match self.executors.for_decision(decision) {
            Some(executor) => {
                debug!(executor = executor.name(), "dispatching");
                let reply = executor.execute(&ctx.input).await;
                ctx.output = reply.output;
                ctx.evidence = reply.evidence;
            }
            None => ctx.output = self.settings.default_message.clone().unwrap_or_default(),
        }
    }
}

fn classification_prompt(input: &str) -> String {
    format!(
        "Input: {input}\n\
         Classify the intent of the input.\n\
         If it asks for an arithmetic calculation (how much, equals, plus, times), answer CALCULATOR.\n\
         If it asks about knowledge or a concept (what is, why, explain), answer KNOWLEDGE.\n\
         Otherwise answer DEFAULT.\n\
         Answer with exactly one word."
    )
}

/// Collects the router's dependencies and validates them in [`build`].
///
/// [`build`]: RouterBuilder::build
pub struct RouterBuilder {
    model: Arc<dyn LanguageModel>,
    executors: HashMap<String, Arc<dyn Executor>>,
    aux_tool: Option<Arc<dyn Tool>>,
    settings: RouterSettings,
}

impl RouterBuilder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model, executors: HashMap::new(), aux_tool: None, settings: RouterSettings::default() }
    }

    /// Registers an executor under [`CALC_EXECUTOR`] or [`RAG_EXECUTOR`].
    pub fn executor(mut self, key: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        self.executors.insert(key.into(), executor);
        self
    }

    pub fn aux_tool(mut self, tool: Option<Arc<dyn Tool>>) -> Self {
        self.aux_tool = tool;
        self
    }

    pub fn settings(mut self, settings: RouterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(mut self) -> Result<Router> {
        let calculator = self.executors.remove(CALC_EXECUTOR);
        let knowledge = self.executors.remove(RAG_EXECUTOR);
        if let Some(unknown) = self.executors.keys().next() {
            return Err(Error::Configuration(format!("unknown executor key '{unknown}'")));
        }
        let (calculator, knowledge) = match (calculator, knowledge) {
            (Some(calculator), Some(knowledge)) => (calculator, knowledge),
            (calculator, knowledge) => {
                let missing: Vec<&str> = [(CALC_EXECUTOR, calculator.is_none()), (RAG_EXECUTOR, knowledge.is_none())]
                    .into_iter()
                    .filter_map(|(key, absent)| absent.then_some(key))
                    .collect();
                return Err(Error::Configuration(format!("router is missing executors: {}", missing.join(", "))));
            }
        };
        if let Some(tool) = &self.aux_tool {
            info!(tool = tool.name(), "auxiliary tool enabled");
        }
        info!(calculator = calculator.name(), knowledge = knowledge.name(), "router ready");
        Ok(Router {
            model: self.model,
            aux_tool: self.aux_tool,
            executors: ExecutorRegistry { calculator, knowledge },
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RouteDecision;

    #[test]
    fn parses_labels_by_containment() {
        assert_eq!(RouteDecision::from_response("CALCULATOR"), RouteDecision::Calculator);
        assert_eq!(RouteDecision::from_response("  the answer is calculator.\n"), RouteDecision::Calculator);
        assert_eq!(RouteDecision::from_response("RAG"), RouteDecision::Knowledge);
        assert_eq!(RouteDecision::from_response("Knowledge"), RouteDecision::Knowledge);
        assert_eq!(RouteDecision::from_response("DEFAULT"), RouteDecision::Default);
        assert_eq!(RouteDecision::from_response(""), RouteDecision::Default);
        assert_eq!(RouteDecision::from_response("no idea"), RouteDecision::Default);
    }

    #[test]
    fn calculator_wins_when_both_labels_appear() {
        assert_eq!(RouteDecision::from_response("KNOWLEDGE or CALCULATOR"), RouteDecision::Calculator);
    }

    #[test]
    fn labels_round_trip_through_display() {
        for decision in [RouteDecision::Calculator, RouteDecision::Knowledge, RouteDecision::Default] {
            assert_eq!(RouteDecision::from_response(&decision.to_string()), decision);
        }
    }
}
