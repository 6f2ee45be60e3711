use calcgrid_common::Position;
use calcgrid_formula::ParseError;
use thiserror::Error;

/// Errors reported by the public [`Sheet`](crate::Sheet) API.
///
/// Every variant carries the strong guarantee: a failed call leaves the
/// sheet observationally unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("position ({}, {}) is outside the sheet", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error("formula syntax error: {0}")]
    FormulaSyntax(#[from] ParseError),

    #[error("formula would create a circular dependency")]
    CircularDependency,
}
