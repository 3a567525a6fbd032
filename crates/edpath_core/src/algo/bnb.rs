use std::{collections::HashMap, sync::Arc, time::Instant};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    Error, Result, Waypoint, WaypointPath,
    algo::{SearchStats, Solution, factorial},
    memo::{MemoEntry, MemoStore, Signature},
    path::order_length,
};

/// Exhaustive branch-and-bound over the interior orderings of a path.
///
/// The search is a plain recursion: each level picks the next waypoint by
/// swapping it to the front of the remaining slice, prunes the whole subtree
/// when the hop alone reaches the bound, and swaps it back afterwards. Only
/// strictly shorter orderings replace the incumbent.
pub struct BranchAndBound<'a> {
    memo: Option<&'a MemoStore>,
    stats: SearchStats,
}

impl<'a> BranchAndBound<'a> {
    pub fn new(memo: Option<&'a MemoStore>) -> Self {
        Self {
            memo,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Solves `path` exactly. The interior is shuffled with `seed` before the
    /// first pass; the as-given order is the initial incumbent, so the result
    /// is never longer than the input.
    pub fn solve(&mut self, path: &WaypointPath, seed: u64) -> Result<Solution> {
        let mut interior = path.interior().to_vec();
        interior.shuffle(&mut StdRng::seed_from_u64(seed));

        let incumbent = Solution {
            length: path.length(),
            order: path.waypoints().to_vec(),
        };

        let best = self
            .best_path(path.start(), &mut interior, path.finish(), incumbent.length)?
            .unwrap_or(incumbent);

        log::debug!(
            "bnb: done interior={} {} length={:.3}",
            path.interior_len(),
            self.stats,
            best.length
        );
        Ok(best)
    }

    /// Shortest completion `prefix_end -> interior -> finish` strictly below
    /// `limit`, or `None` when no ordering beats it.
    ///
    /// `interior` is permuted during the search and restored before return.
    pub fn best_path(
        &mut self,
        prefix_end: &Arc<Waypoint>,
        interior: &mut [Arc<Waypoint>],
        finish: &Arc<Waypoint>,
        limit: f64,
    ) -> Result<Option<Solution>> {
        match interior.len() {
            0 => {
                self.stats.considered += 1;
                let length = prefix_end.distance_to(finish);
                return Ok((length < limit).then(|| Solution {
                    length,
                    order: vec![Arc::clone(prefix_end), Arc::clone(finish)],
                }));
            }
            1 => {
                self.stats.considered += 1;
                let only = &interior[0];
                let length = prefix_end.distance_to(only) + only.distance_to(finish);
                return Ok((length < limit).then(|| Solution {
                    length,
                    order: vec![Arc::clone(prefix_end), Arc::clone(only), Arc::clone(finish)],
                }));
            }
            _ => {}
        }

        if let Some(memo) = self.memo
            && memo.engaged(interior.len())
        {
            return self.memoized(memo, prefix_end, interior, finish, limit);
        }

        self.branch(prefix_end, interior, finish, limit)
    }

    fn branch(
        &mut self,
        prefix_end: &Arc<Waypoint>,
        interior: &mut [Arc<Waypoint>],
        finish: &Arc<Waypoint>,
        mut limit: f64,
    ) -> Result<Option<Solution>> {
        let subtree = factorial(interior.len() - 1);
        let mut best: Option<Solution> = None;

        for i in 0..interior.len() {
            interior.swap(0, i);
            let (head, rest) = interior.split_at_mut(1);
            let head = &head[0];

            let jump = prefix_end.distance_to(head);
            if jump >= limit {
                self.stats.rejected = self.stats.rejected.saturating_add(subtree);
            } else if let Some(sub) = self.best_path(head, rest, finish, limit - jump)? {
                let total = jump + sub.length;
                if total < limit {
                    limit = total;
                    let mut order = Vec::with_capacity(sub.order.len() + 1);
                    order.push(Arc::clone(prefix_end));
                    order.extend(sub.order);
                    best = Some(Solution {
                        length: total,
                        order,
                    });
                }
            }

            interior.swap(0, i);
        }

        Ok(best)
    }

    /// Serves a memo-engaged sub-problem. A miss is solved to optimality
    /// regardless of `limit` so the stored entry is valid for any caller.
    fn memoized(
        &mut self,
        memo: &MemoStore,
        prefix_end: &Arc<Waypoint>,
        interior: &mut [Arc<Waypoint>],
        finish: &Arc<Waypoint>,
        limit: f64,
    ) -> Result<Option<Solution>> {
        let sig = Signature::new(prefix_end, interior, finish);

        if let Some(entry) = memo.lookup(&sig) {
            let order = resolve_order(&sig, &entry, prefix_end, interior, finish)?;
            self.stats.memo_hits += 1;
            log::trace!("memo: hit sig={sig} length={:.3}", entry.length);
            return Ok((entry.length < limit).then_some(Solution {
                length: entry.length,
                order,
            }));
        }

        let started = Instant::now();
        let mut as_given = Vec::with_capacity(interior.len() + 2);
        as_given.push(Arc::clone(prefix_end));
        as_given.extend(interior.iter().cloned());
        as_given.push(Arc::clone(finish));
        let bound = order_length(&as_given);

        let exact = self
            .branch(prefix_end, interior, finish, bound)?
            .unwrap_or(Solution {
                length: bound,
                order: as_given,
            });

        memo.store(
            &sig,
            MemoEntry {
                length: exact.length,
                order: exact.names().into_iter().map(String::from).collect(),
            },
            started.elapsed(),
        )?;
        log::trace!("memo: stored sig={sig} length={:.3}", exact.length);

        Ok((exact.length < limit).then_some(exact))
    }
}

/// Maps a memo entry's names back onto the sub-problem's waypoints.
fn resolve_order(
    sig: &Signature,
    entry: &MemoEntry,
    prefix_end: &Arc<Waypoint>,
    interior: &[Arc<Waypoint>],
    finish: &Arc<Waypoint>,
) -> Result<Vec<Arc<Waypoint>>> {
    let by_name: HashMap<&str, &Arc<Waypoint>> = std::iter::once(prefix_end)
        .chain(interior)
        .chain(std::iter::once(finish))
        .map(|wp| (wp.name(), wp))
        .collect();

    let mismatch = || {
        Error::invalid_data(format!(
            "memo entry does not match its signature: {sig} vs {:?}",
            entry.order
        ))
    };

    if entry.order.len() != interior.len() + 2
        || entry.order.first().map(String::as_str) != Some(prefix_end.name())
        || entry.order.last().map(String::as_str) != Some(finish.name())
    {
        return Err(mismatch());
    }

    let mut seen = std::collections::HashSet::with_capacity(entry.order.len());
    entry
        .order
        .iter()
        .map(|name| {
            let wp = by_name.get(name.as_str()).ok_or_else(mismatch)?;
            if !seen.insert(name.as_str()) {
                return Err(mismatch());
            }
            Ok(Arc::clone(wp))
        })
        .collect()
}
