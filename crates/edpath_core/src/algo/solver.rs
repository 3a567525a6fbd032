use std::sync::Arc;

use crate::{
    Error, Result, Waypoint, WaypointPath,
    algo::{SearchStats, SplitSolver, factorial, insertion::insert_cheapest},
    constants::LENGTH_EPSILON,
    io::options::{SearchMode, SolverOptions},
    memo::MemoStore,
    path::order_length,
};

/// Search knobs shared by every sub-problem of one run.
#[derive(Clone, Debug)]
pub struct SolveConfig {
    pub split_threshold: usize,
    pub split_window: usize,
    pub seed: u64,
    pub search: SearchMode,
    pub parallel: bool,
    pub skip_minor: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self::from(&SolverOptions::default())
    }
}

impl From<&SolverOptions> for SolveConfig {
    fn from(options: &SolverOptions) -> Self {
        Self {
            split_threshold: options.split_threshold,
            split_window: options.split_window,
            seed: options.seed,
            search: options.search,
            parallel: options.parallel,
            skip_minor: options.skip_minor,
        }
    }
}

/// A solved route with the statistics of the search that produced it.
#[derive(Clone, Debug)]
pub struct Route {
    pub order: Vec<Arc<Waypoint>>,
    pub length: f64,
    pub stats: SearchStats,
    /// Size of the full search space, `n!` summed over legs.
    pub space: u64,
    /// Set when any part of the route came from the split heuristic.
    pub approximate: bool,
    pub as_given_length: f64,
    pub direct_length: f64,
}

impl Route {
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|wp| wp.name()).collect()
    }

    /// Share of the search space discarded by pruning, in percent. `None`
    /// for approximate routes, whose sub-searches do not cover `space`.
    pub fn pruned_pct(&self) -> Option<f64> {
        if self.approximate {
            None
        } else if self.space == 0 {
            Some(0.0)
        } else {
            Some(self.stats.rejected as f64 * 100.0 / self.space as f64)
        }
    }
}

pub struct Solver<'a> {
    config: SolveConfig,
    memo: Option<&'a MemoStore>,
}

impl<'a> Solver<'a> {
    pub fn new(config: SolveConfig, memo: Option<&'a MemoStore>) -> Self {
        Self { config, memo }
    }

    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Shortest route through `path` with its endpoints fixed.
    ///
    /// Exact while the interior stays under the split threshold; above it the
    /// result is approximate and flagged as such. Never longer than the
    /// as-given order.
    #[edpath_derive::timer("solve")]
    pub fn solve(&self, path: &WaypointPath) -> Result<Route> {
        let (major, minor) = if self.config.skip_minor {
            path.partition_minor()
        } else {
            (path.clone(), Vec::new())
        };

        log::info!(
            "solve: start from={} to={} interior={} minor_skipped={} search={} direct={:.3}",
            path.start().name(),
            path.finish().name(),
            major.interior_len(),
            minor.len(),
            self.config.search,
            path.direct_length()
        );

        let solved = SplitSolver::new(&self.config, self.memo).solve(
            major.start(),
            major.interior(),
            major.finish(),
        )?;

        let mut order = solved.solution.order;
        let mut length = solved.solution.length;
        if !minor.is_empty() {
            length = insert_cheapest(&mut order, &minor);
        }

        let as_given_length = path.length();
        if length > as_given_length + LENGTH_EPSILON {
            log::info!(
                "solve: keeping as-given order length={length:.3} as_given={as_given_length:.3}"
            );
            order = path.waypoints().to_vec();
            length = as_given_length;
        }

        log::info!(
            "solve: done length={length:.3} {} approximate={}",
            solved.stats,
            solved.approximate
        );

        Ok(Route {
            order,
            length,
            stats: solved.stats,
            space: factorial(major.interior_len()),
            approximate: solved.approximate || !minor.is_empty(),
            as_given_length,
            direct_length: path.direct_length(),
        })
    }

    /// Solves consecutive legs and chains them. Each leg must start where the
    /// previous one finished.
    pub fn solve_legs(&self, legs: &[WaypointPath]) -> Result<Route> {
        let Some(first) = legs.first() else {
            return Err(Error::invalid_input("no legs to solve"));
        };
        for (i, pair) in legs.windows(2).enumerate() {
            if pair[0].finish().name() != pair[1].start().name() {
                return Err(Error::invalid_input(format!(
                    "leg {} ends at {:?} but leg {} starts at {:?}",
                    i + 1,
                    pair[0].finish().name(),
                    i + 2,
                    pair[1].start().name()
                )));
            }
        }

        let mut route = self.solve(first)?;
        for leg in &legs[1..] {
            let next = self.solve(leg)?;
            route.order.extend(next.order.into_iter().skip(1));
            route.stats += next.stats;
            route.space = route.space.saturating_add(next.space);
            route.approximate |= next.approximate;
            route.as_given_length += next.as_given_length;
        }
        route.length = order_length(&route.order);
        if let (Some(start), Some(finish)) = (route.order.first(), route.order.last()) {
            route.direct_length = start.distance_to(finish);
        }

        log::info!(
            "solve: legs={} length={:.3} {}",
            legs.len(),
            route.length,
            route.stats
        );
        Ok(route)
    }
}
