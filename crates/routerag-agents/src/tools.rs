use async_trait::async_trait;
use tracing::debug;

use routerag_core::traits::Tool;
use routerag_core::Result;

use crate::calculator::{evaluate, format_number};

pub const CALCULATOR_TOOL: &str = "math_solver";

/// Evaluates an already extracted expression with the restricted evaluator.
/// Malformed input fails with `Error::ExpressionParse`.
pub struct CalculatorTool {
    name: String,
}

impl CalculatorTool {
    pub fn new() -> Self { Self::named(CALCULATOR_TOOL) }

    pub fn named(name: impl Into<String>) -> Self { Self { name: name.into() } }
}

impl Default for CalculatorTool {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str { &self.name }

    async fn run(&self, input: &str) -> Result<String> {
        let value = evaluate(input)?;
        debug!(tool = %self.name, expression = input, value, "evaluated");
        Ok(format_number(value))
    }
}
