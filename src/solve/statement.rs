use std::fmt;

use frozenset::{Freeze, FrozenSet};
use itertools::Itertools;

use crate::{Cell, InconsistencyError};

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// A logical statement about the board; exactly `count` of `cells` are mines.
///
/// Cells whose status becomes known are removed from the statement, and the
/// count is adjusted so the statement keeps describing the remaining cells.
pub struct Statement<T: Cell> {
    /// Cells the statement talks about
    cells: FrozenSet<T>,
    /// How many of them are mines
    count: usize,
}
impl<T: Cell> Statement<T> {
    pub fn new(
        cells: impl IntoIterator<Item = T>,
        count: usize,
    ) -> Result<Self, InconsistencyError> {
        Self::from_set(cells.into_iter().collect(), count)
    }

    fn from_set(cells: FrozenSet<T>, count: usize) -> Result<Self, InconsistencyError> {
        if count > cells.len() {
            return Err(InconsistencyError("Statement with more mines than cells"));
        }
        Ok(Self {
            cells,
            count,
        })
    }

    pub fn cells(&self) -> &FrozenSet<T> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty statement asserts nothing
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell, if the statement forces all of them to be mines
    pub fn known_mines(&self) -> Option<&FrozenSet<T>> {
        (!self.is_empty() && self.count == self.len()).then_some(&self.cells)
    }

    /// Every cell, if the statement forces all of them to be safe
    pub fn known_safes(&self) -> Option<&FrozenSet<T>> {
        (!self.is_empty() && self.count == 0).then_some(&self.cells)
    }

    /// Remove a cell known to be a mine, decrementing the count.
    ///
    /// Returns whether the statement changed. Fails if the statement says the
    /// cell must be safe.
    pub fn mark_mine(&mut self, cell: &T) -> Result<bool, InconsistencyError> {
        if !self.cells.contains(cell) {
            return Ok(false);
        }
        let count = self
            .count
            .checked_sub(1)
            .ok_or(InconsistencyError("Mine marked in a statement with no mines"))?;
        self.remove(cell);
        self.count = count;
        Ok(true)
    }

    /// Remove a cell known to be safe; the count is unchanged.
    ///
    /// Returns whether the statement changed. Fails if the statement says the
    /// cell must be a mine.
    pub fn mark_safe(&mut self, cell: &T) -> Result<bool, InconsistencyError> {
        if !self.cells.contains(cell) {
            return Ok(false);
        }
        if self.count == self.len() {
            return Err(InconsistencyError(
                "Safe cell marked in a statement of only mines",
            ));
        }
        self.remove(cell);
        Ok(true)
    }

    fn remove(&mut self, cell: &T) {
        let mut cells = std::mem::take(&mut self.cells).thaw();
        cells.remove(cell);
        self.cells = cells.freeze();
    }

    /// Check if this statement's cells are a subset of `other`'s
    ///
    /// Statements over the same cells are subsets of each other.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// If `other` covers a subset of this statement's cells, return the
    /// statement about the cells only this one covers.
    pub fn subtract(&self, other: &Self) -> Result<Self, InconsistencyError> {
        if !other.is_subset_of(self) {
            return Err(InconsistencyError("Subtraction of non-subset statement"));
        }
        let count = self.count.checked_sub(other.count).ok_or(InconsistencyError(
            "Subset statement has more mines than its superset",
        ))?;
        Self::from_set(self.cells.difference(&other.cells).cloned().collect(), count)
    }
}

impl<T: Cell + fmt::Debug + Ord> fmt::Display for Statement<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().map(|cell| format!("{cell:?}")).join(", "),
            self.count
        )
    }
}
