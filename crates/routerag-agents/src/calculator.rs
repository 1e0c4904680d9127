//! Arithmetic intent extraction and a restricted expression evaluator.
//!
//! The evaluator accepts numeric literals, `+ - * /`, unary sign and
//! parentheses. Anything else is a parse error.

use routerag_core::Error;

const TRIGGERS: &[&str] = &["计算", "calculate", "compute"];
const TERMINATORS: &[&str] = &["等于", "equals", "="];
// Longer keywords come first so `加上` is not read as `加` followed by `上`.
const OPERATORS: &[(&str, &str)] = &[
    ("multiplied by", "*"),
    ("divided by", "/"),
    ("乘以", "*"),
    ("加上", "+"),
    ("减去", "-"),
    ("除以", "/"),
    ("times", "*"),
    ("plus", "+"),
    ("minus", "-"),
    ("over", "/"),
    ("乘", "*"),
    ("加", "+"),
    ("减", "-"),
    ("除", "/"),
    ("×", "*"),
    ("÷", "/"),
    ("（", "("),
    ("）", ")"),
];
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected '{found}' at position {pos}")]
    Unexpected { found: char, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("result is not a finite number")]
    NonFinite,
}

impl From<ExpressionError> for Error {
    fn from(e: ExpressionError) -> Self { Error::ExpressionParse(e.to_string()) }
}

/// Pulls an arithmetic expression out of free text.
///
/// Takes the text after the first trigger keyword (the whole input when there
/// is none), cuts it at the first terminator, maps operator keywords to
/// symbols and drops whitespace and trailing question marks. The result is not
/// validated; [`evaluate`] does that.
pub fn extract_expression(input: &str) -> String {
    let lowered = input.to_lowercase();
    let rest = TRIGGERS
        .iter()
        .filter_map(|t| lowered.find(t).map(|pos| (pos, t.len())))
        .min()
        .map_or(lowered.as_str(), |(pos, len)| &lowered[pos + len..]);
    let body = TERMINATORS
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .map_or(rest, |end| &rest[..end]);

    let mut expression = body.to_string();
    for (keyword, symbol) in OPERATORS {
        expression = expression.replace(keyword, symbol);
    }
    expression.retain(|c| !c.is_whitespace());
    expression.trim_end_matches(|c| matches!(c, '?' | '？' | '。')).to_string()
}

pub fn evaluate(expression: &str) -> Result<f64, ExpressionError> {
    let chars: Vec<char> = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.is_empty() { return Err(ExpressionError::Empty); }

    let mut parser = Parser { chars: &chars, pos: 0, depth: 0 };
    let value = parser.expr()?;
    if let Some(found) = parser.peek() {
        return Err(ExpressionError::Unexpected { found, pos: parser.pos });
    }
    if !value.is_finite() { return Err(ExpressionError::NonFinite); }
    Ok(value)
}

/// Integral results print without a fractional part (`60`, not `60.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// expr    := term (('+' | '-') term)*
// term    := factor (('*' | '/') factor)*
// factor  := ('+' | '-') factor | primary
// primary := number | '(' expr ')'
struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> { self.chars.get(self.pos).copied() }

    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut acc = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut acc = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                acc *= rhs;
            } else {
                if rhs == 0.0 { return Err(ExpressionError::DivisionByZero); }
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn factor(&mut self) -> Result<f64, ExpressionError> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                self.nested(Self::factor).map(|v| -v)
            }
            Some('+') => {
                self.pos += 1;
                self.nested(Self::factor)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, ExpressionError> {
        match self.peek() {
            None => Err(ExpressionError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(ExpressionError::Unexpected { found, pos: self.pos }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(found) => Err(ExpressionError::Unexpected { found, pos: self.pos }),
        }
    }

    fn number(&mut self) -> Result<f64, ExpressionError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse::<f64>().map_err(|_| ExpressionError::InvalidNumber(literal))
    }

    fn nested<F>(&mut self, parse: F) -> Result<f64, ExpressionError>
    where
        F: FnOnce(&mut Self) -> Result<f64, ExpressionError>,
    {
        if self.depth >= MAX_DEPTH { return Err(ExpressionError::TooDeep(MAX_DEPTH)); }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_chinese_requests() {
        assert_eq!(extract_expression("帮我计算 12 乘以 5 等于多少？"), "12*5");
        assert_eq!(extract_expression("帮我计算 (12 乘以 5) 加上 3 等于多少？"), "(12*5)+3");
        assert_eq!(extract_expression("计算（8 减去 2）除以 3？"), "(8-2)/3");
        assert_eq!(extract_expression("请计算 9 减 4 加 1"), "9-4+1");
    }

    #[test]
    fn extracts_from_english_requests() {
        assert_eq!(extract_expression("Please calculate 7 times 6"), "7*6");
        assert_eq!(extract_expression("compute 10 divided by 4 = ?"), "10/4");
        assert_eq!(extract_expression("Calculate 3 plus 4 minus 1 equals what"), "3+4-1");
        assert_eq!(extract_expression("compute 2 multiplied by 8 over 4"), "2*8/4");
    }

    #[test]
    fn without_trigger_uses_whole_input() {
        assert_eq!(extract_expression("3 plus 4?"), "3+4");
        assert_eq!(extract_expression(""), "");
    }

    #[test]
    fn first_trigger_and_first_terminator_win() {
        assert_eq!(extract_expression("计算 1 加 1 等于 2 等于 3"), "1+1");
        assert_eq!(extract_expression("compute 2 times 3, then calculate 5"), "2*3,thencalculate5");
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(evaluate("12*5").unwrap(), 60.0);
        assert_eq!(evaluate("(12*5)+3").unwrap(), 63.0);
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("20/4/5").unwrap(), 1.0);
        assert_eq!(evaluate("10-4-3").unwrap(), 3.0);
        assert_eq!(evaluate("1.5*2").unwrap(), 3.0);
    }

    #[test]
    fn unary_signs() {
        assert_eq!(evaluate("-3+5").unwrap(), 2.0);
        assert_eq!(evaluate("2*-3").unwrap(), -6.0);
        assert_eq!(evaluate("-(2+3)").unwrap(), -5.0);
        assert_eq!(evaluate("--4").unwrap(), 4.0);
        assert_eq!(evaluate("+7").unwrap(), 7.0);
    }

    #[test]
    fn rejects_anything_outside_the_grammar() {
        assert_eq!(evaluate(""), Err(ExpressionError::Empty));
        assert!(matches!(evaluate("__import__('os')"), Err(ExpressionError::Unexpected { found: '_', pos: 0 })));
        assert!(matches!(evaluate("2^3"), Err(ExpressionError::Unexpected { found: '^', pos: 1 })));
        assert!(matches!(evaluate("12*5多少"), Err(ExpressionError::Unexpected { found: '多', .. })));
        assert_eq!(evaluate("(1+2"), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("1+"), Err(ExpressionError::UnexpectedEnd));
        assert!(matches!(evaluate("1+2)"), Err(ExpressionError::Unexpected { found: ')', pos: 3 })));
        assert_eq!(evaluate("1.2.3"), Err(ExpressionError::InvalidNumber("1.2.3".into())));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(evaluate("1/0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate("1/(2-2)"), Err(ExpressionError::DivisionByZero));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&deep), Err(ExpressionError::TooDeep(MAX_DEPTH)));
        let signs = format!("{}1", "-".repeat(200));
        assert_eq!(evaluate(&signs), Err(ExpressionError::TooDeep(MAX_DEPTH)));
        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow).unwrap(), 1.0);
    }

    #[test]
    fn formats_integral_results_without_fraction() {
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(-6.0), "-6");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn converts_into_the_crate_error() {
        let err: Error = ExpressionError::DivisionByZero.into();
        assert!(matches!(err, Error::ExpressionParse(ref m) if m == "division by zero"));
    }
}
