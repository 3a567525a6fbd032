use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    Waypoint, WaypointPath,
    algo::{Permutations, SearchStats, Solution, Step, factorial},
};

/// Branch-and-bound driven by a [`Permutations`] cursor instead of recursion.
///
/// Each placement extends the running prefix cost; a partial prefix that
/// already reaches the bound is cancelled and its `(n - level - 1)!`
/// completions are counted as rejected. Finds the same optimum as
/// [`BranchAndBound`](crate::algo::BranchAndBound) and never consults the memo.
pub fn cursor_search(path: &WaypointPath, seed: u64) -> (Solution, SearchStats) {
    let start = path.start();
    let finish = path.finish();
    let n = path.interior_len();

    let mut interior = path.interior().to_vec();
    interior.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut stats = SearchStats::default();
    let mut best = Solution {
        length: path.length(),
        order: path.waypoints().to_vec(),
    };
    let mut limit = best.length;

    // prefix_cost[k]: start plus the first k placed waypoints.
    let mut prefix_cost = vec![0.0; n + 1];
    let mut perms = Permutations::new(interior);

    while let Some(step) = perms.step() {
        match step {
            Step::Placed(level) => {
                let placed = perms.prefix();
                let prev = if level == 0 { start } else { &placed[level - 1] };
                let cost = prefix_cost[level] + prev.distance_to(&placed[level]);

                // The last placement is a complete ordering and always counts
                // as considered.
                if level + 1 < n && cost >= limit {
                    stats.rejected = stats.rejected.saturating_add(factorial(n - level - 1));
                    perms.cancel();
                } else {
                    prefix_cost[level + 1] = cost;
                }
            }
            Step::Complete => {
                stats.considered += 1;
                let items = perms.items();
                let last = items.last().unwrap_or(start);
                let total = prefix_cost[n] + last.distance_to(finish);

                if total < limit {
                    limit = total;
                    best = Solution {
                        length: total,
                        order: with_endpoints(start, items, finish),
                    };
                }
            }
        }
    }

    log::debug!(
        "cursor: done interior={n} {stats} length={:.3}",
        best.length
    );
    (best, stats)
}

fn with_endpoints(
    start: &Arc<Waypoint>,
    interior: &[Arc<Waypoint>],
    finish: &Arc<Waypoint>,
) -> Vec<Arc<Waypoint>> {
    let mut order = Vec::with_capacity(interior.len() + 2);
    order.push(Arc::clone(start));
    order.extend(interior.iter().cloned());
    order.push(Arc::clone(finish));
    order
}
