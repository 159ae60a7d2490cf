use crate::cell::Cell;
use crate::error::KnowledgeError;
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// The cell set is kept sorted, so two constraints over the same cells compare
/// and hash equal no matter the order the cells were collected in. That
/// equality is what the knowledge base deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawConstraint")]
pub struct Constraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

/// Wire shape of a [`Constraint`], checked by [`Constraint::new`] on the way in.
#[derive(serde::Deserialize)]
struct RawConstraint {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl TryFrom<RawConstraint> for Constraint {
    type Error = KnowledgeError;

    fn try_from(raw: RawConstraint) -> Result<Self, Self::Error> {
        Constraint::new(raw.cells, raw.count)
    }
}

impl Constraint {
    /// Builds a constraint, rejecting one that claims more mines than cells.
    pub fn new(
        cells: impl IntoIterator<Item = Cell>,
        count: usize,
    ) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::Overfull {
                size: cells.len(),
                count,
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Every cell, if the constraint says all of them are mines.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell, if the constraint says none of them are mines.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Accounts for `cell` being a mine: it leaves the set and takes one mine
    /// with it. Returns whether the constraint changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(KnowledgeError::NegativeCount { cell });
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Accounts for `cell` being safe: it leaves the set, the count stays.
    /// Returns whether the constraint changed.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, KnowledgeError> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count >= self.cells.len() {
            return Err(KnowledgeError::Overfull {
                size: self.cells.len() - 1,
                count: self.count,
            });
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    pub fn is_subset(&self, other: &Constraint) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset resolution. With `self` a subset of `superset`, the cells only
    /// the superset covers hold exactly the difference of the two counts.
    pub fn resolve(&self, superset: &Constraint) -> Result<Constraint, KnowledgeError> {
        debug_assert!(self.is_subset(superset));

        let count = superset
            .count
            .checked_sub(self.count)
            .ok_or(KnowledgeError::Underflow {
                subset: self.count,
                superset: superset.count,
            })?;

        Constraint::new(superset.cells.difference(&self.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
