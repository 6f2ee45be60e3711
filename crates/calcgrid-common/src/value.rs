use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CellError;

/// The computed value of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Text(String),
    Number(f64),
    Error(CellError),
}

impl Value {
    /// The value of an empty cell
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Try to coerce the value to a number.
    ///
    /// Empty text behaves as zero so that a formula referencing a blank
    /// cell still evaluates arithmetically; non-numeric text does not
    /// coerce and arithmetic on it yields `#VALUE!`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) if s.is_empty() => Some(0.0),
            Value::Text(s) => s.parse().ok(),
            Value::Error(_) => None,
        }
    }

    /// Render the value as a string (display form)
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}
