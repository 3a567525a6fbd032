pub mod bnb;
pub mod cursor;
pub mod insertion;
pub mod permutation;
pub mod solver;
pub mod split;

use std::{fmt, ops::AddAssign, sync::Arc};

use crate::Waypoint;

pub use bnb::BranchAndBound;
pub use cursor::cursor_search;
pub use permutation::{Permutations, Step};
pub use solver::{Route, SolveConfig, Solver};
pub use split::SplitSolver;

/// Best ordering found for one sub-problem, endpoints included.
#[derive(Clone, Debug)]
pub struct Solution {
    pub length: f64,
    pub order: Vec<Arc<Waypoint>>,
}

impl Solution {
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|wp| wp.name()).collect()
    }
}

/// Search counters.
///
/// `considered` counts complete orderings whose length was evaluated,
/// `rejected` counts orderings discarded inside pruned subtrees without
/// being visited. When no memo hit occurs their sum is `n!` for a search
/// over `n` interior waypoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub considered: u64,
    pub rejected: u64,
    pub memo_hits: u64,
}

impl SearchStats {
    pub fn visited(&self) -> u64 {
        self.considered.saturating_add(self.rejected)
    }
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.considered = self.considered.saturating_add(rhs.considered);
        self.rejected = self.rejected.saturating_add(rhs.rejected);
        self.memo_hits = self.memo_hits.saturating_add(rhs.memo_hits);
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "considered={} rejected={} memo_hits={}",
            self.considered, self.rejected, self.memo_hits
        )
    }
}

/// `n!`, saturating at `u64::MAX` (from `n = 21` on).
pub fn factorial(n: usize) -> u64 {
    (2..=n as u64).fold(1u64, |acc, k| acc.saturating_mul(k))
}
