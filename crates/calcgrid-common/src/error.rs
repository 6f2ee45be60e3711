use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluation-error kinds (Excel-compatible mnemonics).
///
/// These are in-band values: a formula that fails to evaluate produces
/// `Value::Error` rather than a Rust-level error, and the result is cached
/// and propagated through dependent formulas like any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellError {
    /// #REF! - Invalid cell reference
    Ref,
    /// #VALUE! - Invalid value type
    Value,
    /// #DIV/0! - Division by zero
    Div0,
    /// #NUM! - Invalid numeric value
    Num,
    /// #NAME? - Unrecognized function name
    Name,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::Ref => write!(f, "#REF!"),
            CellError::Value => write!(f, "#VALUE!"),
            CellError::Div0 => write!(f, "#DIV/0!"),
            CellError::Num => write!(f, "#NUM!"),
            CellError::Name => write!(f, "#NAME?"),
        }
    }
}
