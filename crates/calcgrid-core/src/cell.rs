use std::cell::RefCell;
use std::collections::HashSet;

use calcgrid_common::{Position, Value};
use calcgrid_formula::Formula;

use crate::sheet::Sheet;

/// First character of a formula cell's input text
pub const FORMULA_SIGN: char = '=';
/// Leading character that keeps text from being interpreted; stripped by
/// `value()`, kept by `text()`
pub const ESCAPE_SIGN: char = '\'';

/// The contents of a cell.
///
/// The formula cache is the single interior-mutability point in the
/// engine: `value()` is a logically read-only query that may populate it,
/// and invalidation clears it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellBody {
    Empty,
    Text(String),
    Formula {
        formula: Formula,
        cache: RefCell<Option<Value>>,
    },
}

impl Default for CellBody {
    fn default() -> Self {
        CellBody::Empty
    }
}

impl CellBody {
    /// Wrap a parsed formula with an unpopulated cache
    pub fn formula(formula: Formula) -> Self {
        CellBody::Formula {
            formula,
            cache: RefCell::new(None),
        }
    }

    /// The raw input form: empty string, the text verbatim (escape sign
    /// kept), or `=` plus the canonical expression.
    pub fn text(&self) -> String {
        match self {
            CellBody::Empty => String::new(),
            CellBody::Text(s) => s.clone(),
            CellBody::Formula { formula, .. } => {
                format!("{}{}", FORMULA_SIGN, formula.expression())
            }
        }
    }

    /// The computed value. For a formula this returns the cached result,
    /// evaluating once against `sheet` on a cache miss.
    pub fn value(&self, sheet: &Sheet) -> Value {
        match self {
            CellBody::Empty => Value::empty(),
            CellBody::Text(s) => {
                let shown = s.strip_prefix(ESCAPE_SIGN).unwrap_or(s);
                Value::Text(shown.to_string())
            }
            CellBody::Formula { formula, cache } => {
                {
                    let cached = cache.borrow();
                    if let Some(value) = cached.as_ref() {
                        return value.clone();
                    }
                }
                // The borrow is released before evaluation: resolving a
                // referent may recurse through the sheet into other cells.
                let value = formula.evaluate(|pos| sheet.cell_value(pos));
                *cache.borrow_mut() = Some(value.clone());
                value
            }
        }
    }

    /// Positions this body references directly; empty for non-formulas.
    /// Duplicates are possible and callers must tolerate them.
    pub fn referenced_cells(&self) -> Vec<Position> {
        match self {
            CellBody::Formula { formula, .. } => formula.referenced_cells(),
            _ => Vec::new(),
        }
    }

    pub fn invalidate_cache(&self) {
        if let CellBody::Formula { cache, .. } = self {
            cache.borrow_mut().take();
        }
    }

    /// True unless this is a formula with an unpopulated cache. A formula
    /// without a cache marks a subtree the invalidation sweep may prune.
    pub fn has_cache(&self) -> bool {
        match self {
            CellBody::Formula { cache, .. } => cache.borrow().is_some(),
            _ => true,
        }
    }
}

/// A single grid node: its body plus back-references to the cells whose
/// formulas directly reference this one.
///
/// `dependents` entries are positions into the owning sheet's map, not
/// owned handles; the sheet guarantees their lifetime and keeps the edge
/// set bidirectionally consistent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    body: CellBody,
    dependents: HashSet<Position>,
}

impl Cell {
    pub fn body(&self) -> &CellBody {
        &self.body
    }

    pub fn value(&self, sheet: &Sheet) -> Value {
        self.body.value(sheet)
    }

    pub fn text(&self) -> String {
        self.body.text()
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.body.referenced_cells()
    }

    /// True iff at least one formula cell references this one. A used
    /// cell survives `clear_cell` as an empty placeholder.
    pub fn is_used(&self) -> bool {
        !self.dependents.is_empty()
    }

    /// Positions of the cells that directly depend on this one
    pub fn dependents(&self) -> impl Iterator<Item = Position> + '_ {
        self.dependents.iter().copied()
    }

    pub(crate) fn set_body(&mut self, body: CellBody) {
        self.body = body;
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    pub(crate) fn invalidate_cache(&self) {
        self.body.invalidate_cache();
    }

    pub(crate) fn has_cache(&self) -> bool {
        self.body.has_cache()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body() {
        let body = CellBody::Empty;
        assert_eq!(body.text(), "");
        assert_eq!(body.value(&Sheet::new()), Value::empty());
        assert!(body.referenced_cells().is_empty());
        assert!(body.has_cache());
    }

    #[test]
    fn test_text_body_escape() {
        let body = CellBody::Text("'123".to_string());
        assert_eq!(body.value(&Sheet::new()), Value::Text("123".to_string()));
        assert_eq!(body.text(), "'123");

        let plain = CellBody::Text("hello".to_string());
        assert_eq!(plain.value(&Sheet::new()), Value::Text("hello".to_string()));
        assert_eq!(plain.text(), "hello");
    }

    #[test]
    fn test_lone_escape_sign() {
        let body = CellBody::Text("'".to_string());
        assert_eq!(body.value(&Sheet::new()), Value::Text(String::new()));
        assert_eq!(body.text(), "'");
    }

    #[test]
    fn test_formula_body_caches() {
        let body = CellBody::formula(Formula::parse("1+2").unwrap());
        assert!(!body.has_cache());

        let sheet = Sheet::new();
        assert_eq!(body.value(&sheet), Value::Number(3.0));
        assert!(body.has_cache());

        body.invalidate_cache();
        assert!(!body.has_cache());
    }

    #[test]
    fn test_formula_text_is_canonical() {
        let body = CellBody::formula(Formula::parse(" 1 + 2 ").unwrap());
        assert_eq!(body.text(), "=1+2");
    }

    #[test]
    fn test_cell_usage() {
        let mut cell = Cell::default();
        assert!(!cell.is_used());

        cell.add_dependent(Position::new(0, 0));
        assert!(cell.is_used());
        assert_eq!(cell.dependents().collect::<Vec<_>>(), vec![Position::new(0, 0)]);

        cell.remove_dependent(Position::new(0, 0));
        assert!(!cell.is_used());
    }
}
