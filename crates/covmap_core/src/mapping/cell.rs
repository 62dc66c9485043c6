use std::collections::BTreeSet;

use crate::point::Coverage;

/// Search state of one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellState {
    /// No coverage yet. `tried` holds indices into the search directions that
    /// have been used (or ruled out) for this cell.
    Unresolved { tried: BTreeSet<usize> },
    Resolved { coverage: Coverage },
}

impl Default for CellState {
    fn default() -> Self {
        CellState::Unresolved {
            tried: BTreeSet::new(),
        }
    }
}

impl CellState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, CellState::Resolved { .. })
    }

    /// Every direction has been tried without finding a solution.
    pub fn is_exhausted(&self, n_directions: usize) -> bool {
        match self {
            CellState::Unresolved { tried } => tried.len() >= n_directions,
            CellState::Resolved { .. } => false,
        }
    }

    pub fn needs_search(&self, n_directions: usize) -> bool {
        !self.is_resolved() && !self.is_exhausted(n_directions)
    }

    /// Progress weight of the cell. Grows whenever a direction is tried or the
    /// cell is resolved, and a resolved cell outweighs any unresolved one.
    ///
    /// Direction `k` of `n` is worth `2^(n - 1 - k)`; a resolved cell is worth
    /// `2^(n + 1) - 1`.
    pub fn score(&self, n_directions: usize) -> f64 {
        match self {
            CellState::Unresolved { tried } => tried
                .iter()
                .map(|&k| 2f64.powi((n_directions - 1 - k) as i32))
                .sum(),
            CellState::Resolved { .. } => 2f64.powi(n_directions as i32 + 1) - 1.0,
        }
    }
}
