pub mod ast;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use evaluator::Evaluator;
pub use lexer::{Lexer, Token};
pub use parser::Parser;

use calcgrid_common::{Position, Value};
use thiserror::Error;

/// Error produced when an expression cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(String);

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A parsed formula expression.
///
/// The handle is immutable: parsing happens once, and the sheet engine
/// queries it for evaluation, the canonical text form, and the set of
/// referenced positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: Expr,
}

impl Formula {
    /// Parse an expression (without any leading `=` sign).
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(expression).tokenize()?;
        let ast = Parser::new(tokens).parse()?;
        Ok(Self { ast })
    }

    /// Evaluate against the current cell values, supplied by `resolve`.
    ///
    /// Evaluation failures are in-band `Value::Error`s, never a Rust error.
    pub fn evaluate<F>(&self, resolve: F) -> Value
    where
        F: Fn(Position) -> Value,
    {
        Evaluator::new(resolve).evaluate(&self.ast)
    }

    /// Canonical textual form, without a leading `=` sign
    pub fn expression(&self) -> String {
        self.ast.to_string()
    }

    /// Every cell position the expression references, ranges expanded.
    /// Duplicates are possible; all positions are valid grid coordinates.
    pub fn referenced_cells(&self) -> Vec<Position> {
        let mut refs = Vec::new();
        collect_references(&self.ast, &mut refs);
        refs
    }
}

/// Recursively collect cell references from an AST
fn collect_references(expr: &Expr, refs: &mut Vec<Position>) {
    match expr {
        Expr::CellRef { pos, .. } => refs.push(*pos),
        Expr::Range { start, end } => {
            if let (Expr::CellRef { pos: s, .. }, Expr::CellRef { pos: e, .. }) =
                (start.as_ref(), end.as_ref())
            {
                for row in s.row.min(e.row)..=s.row.max(e.row) {
                    for col in s.col.min(e.col)..=s.col.max(e.col) {
                        refs.push(Position::new(row, col));
                    }
                }
            }
        }
        Expr::Binary { left, right, .. } => {
            collect_references(left, refs);
            collect_references(right, refs);
        }
        Expr::Unary { operand, .. } => collect_references(operand, refs),
        Expr::FunctionCall { args, .. } => {
            for arg in args {
                collect_references(arg, refs);
            }
        }
        Expr::Grouped(inner) => collect_references(inner, refs),
        Expr::Number(_) | Expr::String(_) => {}
    }
}
