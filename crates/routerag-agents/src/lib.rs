//! Intent routing on top of the hybrid retrieval engine: a calculator path
//! with a restricted evaluator, a knowledge path backed by retrieval, and the
//! router that picks between them.

pub mod calculator;
pub mod executors;
pub mod router;
pub mod tools;
pub mod wiring;

pub use executors::{CalculatorExecutor, Executor, ExecutorReply, KnowledgeExecutor};
pub use router::{RouteDecision, RouteOutcome, Router, RouterBuilder, RoutingContext, CALC_EXECUTOR, RAG_EXECUTOR};
pub use tools::{CalculatorTool, CALCULATOR_TOOL};
pub use wiring::{assemble, Assembly, Components};
