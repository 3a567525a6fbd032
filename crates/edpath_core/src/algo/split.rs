//! Divide-and-conquer fallback for interiors too large to search exhaustively.
//!
//! Waypoints are ranked by where they fall along the start-finish axis and
//! cut into two halves around a boundary waypoint; each half is solved on its
//! own and the two routes are joined at the boundary. A few cut positions
//! around the midpoint are tried and the shortest join wins.
//!
//! This is an approximation. The best global order may cross the cut in a
//! way the axial ranking cannot see, and no bound on the resulting error is
//! known. Routes produced here are flagged `approximate`.

use std::{collections::HashSet, sync::Arc};

use crate::{
    Error, Result, Waypoint, WaypointPath,
    algo::{BranchAndBound, SearchStats, Solution, SolveConfig, cursor_search},
    constants::MAX_SPLIT_WINDOW,
    io::options::SearchMode,
    memo::MemoStore,
};

/// A solved sub-problem with the counters it accumulated.
#[derive(Clone, Debug)]
pub struct Solved {
    pub solution: Solution,
    pub stats: SearchStats,
    pub approximate: bool,
}

pub struct SplitSolver<'a> {
    config: &'a SolveConfig,
    memo: Option<&'a MemoStore>,
}

impl<'a> SplitSolver<'a> {
    pub fn new(config: &'a SolveConfig, memo: Option<&'a MemoStore>) -> Self {
        Self { config, memo }
    }

    /// Solves `start -> interior -> finish`, exhaustively when the interior
    /// fits under the split threshold and by splitting otherwise.
    pub fn solve(
        &self,
        start: &Arc<Waypoint>,
        interior: &[Arc<Waypoint>],
        finish: &Arc<Waypoint>,
    ) -> Result<Solved> {
        if interior.len() > self.config.split_threshold {
            return self.split(start, interior, finish);
        }

        let path = WaypointPath::from_parts(
            Arc::clone(start),
            interior.iter().cloned(),
            Arc::clone(finish),
        )?;
        let (solution, stats) = match self.config.search {
            SearchMode::Recursive => {
                let mut bnb = BranchAndBound::new(self.memo);
                let solution = bnb.solve(&path, self.config.seed)?;
                (solution, bnb.stats())
            }
            SearchMode::Cursor => cursor_search(&path, self.config.seed),
        };
        Ok(Solved {
            solution,
            stats,
            approximate: false,
        })
    }

    fn split(
        &self,
        start: &Arc<Waypoint>,
        interior: &[Arc<Waypoint>],
        finish: &Arc<Waypoint>,
    ) -> Result<Solved> {
        let sorted = rank_along_axis(start, interior, finish);
        let len = sorted.len();
        let mid = len / 2;
        let window = self.config.split_window.min(MAX_SPLIT_WINDOW).min(mid) as isize;

        log::debug!(
            "split: start interior={len} from={} to={} window={window}",
            start.name(),
            finish.name()
        );

        let mut stats = SearchStats::default();
        let mut best: Option<Solution> = None;
        let mut tried = HashSet::new();

        for offset in -window..=window {
            let cut = (mid as isize + offset).clamp(0, len as isize - 1) as usize;
            if !tried.insert(cut) {
                continue;
            }

            let boundary = &sorted[cut];
            let left = &sorted[..cut];
            let right = &sorted[cut + 1..];

            let (l, r) = if self.config.parallel {
                rayon::join(
                    || self.solve(start, left, boundary),
                    || self.solve(boundary, right, finish),
                )
            } else {
                (
                    self.solve(start, left, boundary),
                    self.solve(boundary, right, finish),
                )
            };
            let (l, r) = (l?, r?);
            stats += l.stats;
            stats += r.stats;

            let joined = join_halves(l.solution, r.solution)?;
            log::debug!(
                "split: offset={offset} boundary={} left={} right={} length={:.3}",
                boundary.name(),
                left.len(),
                right.len(),
                joined.length
            );

            if best.as_ref().is_none_or(|b| joined.length < b.length) {
                best = Some(joined);
            }
        }

        let solution =
            best.ok_or_else(|| Error::other(format!("split: no cut tried interior={len}")))?;
        Ok(Solved {
            solution,
            stats,
            approximate: true,
        })
    }
}

/// `d(start, w) / (d(start, w) + d(finish, w))` in `[0, 1]`; 0.5 when `w`
/// coincides with both endpoints.
pub fn axis_ratio(start: &Waypoint, w: &Waypoint, finish: &Waypoint) -> f64 {
    let to_start = start.distance_to(w);
    let to_finish = finish.distance_to(w);
    let total = to_start + to_finish;
    if total > 0.0 { to_start / total } else { 0.5 }
}

/// Interior sorted by [`axis_ratio`], ties broken by name.
pub fn rank_along_axis(
    start: &Waypoint,
    interior: &[Arc<Waypoint>],
    finish: &Waypoint,
) -> Vec<Arc<Waypoint>> {
    let mut ranked: Vec<(f64, &Arc<Waypoint>)> = interior
        .iter()
        .map(|w| (axis_ratio(start, w, finish), w))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.name().cmp(b.1.name())));
    ranked.into_iter().map(|(_, w)| Arc::clone(w)).collect()
}

/// Concatenates two half routes that share their boundary waypoint.
pub fn join_halves(left: Solution, right: Solution) -> Result<Solution> {
    let left_end = left.order.last().map(|w| w.name());
    let right_start = right.order.first().map(|w| w.name());
    if left_end.is_none() || left_end != right_start {
        return Err(Error::other(format!(
            "split: halves do not meet left_end={left_end:?} right_start={right_start:?}"
        )));
    }

    let mut order = left.order;
    order.extend(right.order.into_iter().skip(1));
    Ok(Solution {
        length: left.length + right.length,
        order,
    })
}
