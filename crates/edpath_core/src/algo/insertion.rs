use std::sync::Arc;

use crate::{Waypoint, path::order_length};

/// Threads `extra` waypoints into a solved `order`, one at a time, each at
/// the position that adds the least length. The endpoints stay in place.
pub fn insert_cheapest(order: &mut Vec<Arc<Waypoint>>, extra: &[Arc<Waypoint>]) -> f64 {
    for wp in extra {
        let Some((pos, added)) = cheapest_position(order, wp) else {
            continue;
        };
        log::trace!("insertion: name={} pos={pos} added={added:.3}", wp.name());
        order.insert(pos, Arc::clone(wp));
    }
    order_length(order)
}

/// Index to insert `wp` at (between `order[i-1]` and `order[i]`) and the
/// length it adds. `None` when `order` has fewer than two elements.
fn cheapest_position(order: &[Arc<Waypoint>], wp: &Waypoint) -> Option<(usize, f64)> {
    order
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let added =
                pair[0].distance_to(wp) + wp.distance_to(&pair[1]) - pair[0].distance_to(&pair[1]);
            (i + 1, added)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
