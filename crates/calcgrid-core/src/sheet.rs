use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use tracing::{debug, trace};

use calcgrid_common::{Position, Size, Value};
use calcgrid_formula::Formula;

use crate::cell::{Cell, CellBody, FORMULA_SIGN};
use crate::error::SheetError;

/// A sparse spreadsheet: only touched positions have a map entry.
///
/// The sheet owns every cell and is the only type with whole-grid
/// visibility, so the graph-level steps of an edit (cycle check, edge
/// rewiring, cache invalidation) live here while [`Cell`] and
/// [`CellBody`] handle the per-node operations.
///
/// Invariants maintained across every public mutation:
/// - every position referenced by an installed formula has a map entry
///   (materialized empty if never set explicitly);
/// - the dependency graph is acyclic;
/// - dependency edges are bidirectionally consistent;
/// - `size` is the tight bounding box over the map's keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    size: Size,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw text of a cell.
    ///
    /// Empty text installs an empty body, text starting with `=` (and at
    /// least one more character) is parsed as a formula, anything else is
    /// stored verbatim as text. A formula that fails to parse or would
    /// close a reference cycle is rejected with the sheet unchanged.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }

        // Unchanged text is a full no-op; dependencies cannot have changed
        if let Some(cell) = self.cells.get(&pos) {
            if cell.text() == text {
                return Ok(());
            }
        }

        let body = build_body(text)?;
        let new_refs = body.referenced_cells();
        if !new_refs.is_empty() {
            self.check_circular(pos, &new_refs)?;
        }

        debug!("set cell {} to {:?}", pos, text);

        // Commit point: nothing below can fail
        self.remove_outgoing_edges(pos);
        self.cells.entry(pos).or_default().set_body(body);
        for &referent in &new_refs {
            self.cells.entry(referent).or_default().add_dependent(pos);
            self.size.cover(referent);
        }
        self.invalidate_from(pos, true);
        self.size.cover(pos);

        Ok(())
    }

    /// Clear a cell back to empty.
    ///
    /// The map entry is dropped unless other formulas still reference the
    /// position, in which case an empty placeholder remains. The
    /// printable region shrinks to fit the remaining cells.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }

        debug!("clear cell {}", pos);

        self.remove_outgoing_edges(pos);
        // Dependent caches are swept while the old body is still in place
        self.invalidate_from(pos, true);

        let mut still_used = false;
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.set_body(CellBody::Empty);
            still_used = cell.is_used();
        }
        if !still_used {
            self.cells.remove(&pos);
        }

        self.size = self.recompute_size();
        Ok(())
    }

    /// The cell at `pos`, if any position ever touched it
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>, SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        Ok(self.cells.get(&pos))
    }

    /// The smallest rectangle containing every occupied cell
    pub fn printable_size(&self) -> Size {
        self.size
    }

    /// Print computed values: tab between columns, newline after every
    /// row, nothing for absent cells.
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    write!(out, "{}", cell.value(self))?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Print raw cell texts with the same framing as [`print_values`](Self::print_values)
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    write!(out, "{}", cell.text())?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Resolve the value at a position for formula evaluation; absent
    /// cells read as empty.
    pub(crate) fn cell_value(&self, pos: Position) -> Value {
        match self.cells.get(&pos) {
            Some(cell) => cell.value(self),
            None => Value::empty(),
        }
    }

    /// Reject a candidate formula at `pos` whose referents are `refs` if
    /// installing it would close a cycle.
    ///
    /// The new body adds edges `pos -> r` for each `r` in `refs`, so a
    /// cycle exists iff some `r` already reaches `pos`, i.e. iff walking
    /// the reverse graph (dependents edges) from `pos` meets a referent.
    /// The walk runs on the graph as it exists before the edit;
    /// termination follows from its acyclicity plus the visited set.
    fn check_circular(&self, pos: Position, refs: &[Position]) -> Result<(), SheetError> {
        let refs: HashSet<Position> = refs.iter().copied().collect();
        let mut visited: HashSet<Position> = HashSet::new();
        let mut to_visit = vec![pos];

        while let Some(cur) = to_visit.pop() {
            if refs.contains(&cur) {
                return Err(SheetError::CircularDependency);
            }
            if !visited.insert(cur) {
                continue;
            }
            if let Some(cell) = self.cells.get(&cur) {
                to_visit.extend(cell.dependents().filter(|d| !visited.contains(d)));
            }
        }

        Ok(())
    }

    /// Remove `pos` from the dependents of everything its current body
    /// references. Symmetric to the rewiring in `set_cell`.
    fn remove_outgoing_edges(&mut self, pos: Position) {
        let old_refs = match self.cells.get(&pos) {
            Some(cell) => cell.referenced_cells(),
            None => return,
        };
        for referent in old_refs {
            // Referenced positions always have a map entry
            debug_assert!(self.cells.contains_key(&referent));
            if let Some(cell) = self.cells.get_mut(&referent) {
                cell.remove_dependent(pos);
            }
        }
    }

    /// Clear the caches of every formula that transitively depends on
    /// `origin`, including `origin` itself.
    ///
    /// A dependent whose cache is already unpopulated marks a subtree the
    /// previous sweep cleaned; it is pruned. `force` pushes past the
    /// origin's own missing cache (a freshly installed body never has
    /// one) so its dependents are still reached.
    fn invalidate_from(&self, origin: Position, force: bool) {
        let mut visited: HashSet<Position> = HashSet::new();
        let mut to_visit = vec![origin];

        while let Some(cur) = to_visit.pop() {
            if !visited.insert(cur) {
                continue;
            }
            let cell = match self.cells.get(&cur) {
                Some(cell) => cell,
                None => continue,
            };
            if !cell.has_cache() && !(force && cur == origin) {
                continue;
            }
            trace!("invalidate cache at {}", cur);
            cell.invalidate_cache();
            to_visit.extend(cell.dependents());
        }
    }

    fn recompute_size(&self) -> Size {
        let mut size = Size::default();
        for &pos in self.cells.keys() {
            size.cover(pos);
        }
        size
    }
}

fn build_body(text: &str) -> Result<CellBody, SheetError> {
    if text.is_empty() {
        Ok(CellBody::Empty)
    } else if text.len() > 1 && text.starts_with(FORMULA_SIGN) {
        let formula = Formula::parse(&text[1..])?;
        Ok(CellBody::formula(formula))
    } else {
        // A lone '=' is ordinary text
        Ok(CellBody::Text(text.to_string()))
    }
}
