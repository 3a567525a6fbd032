use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{Coords, constants::MINOR_MARKER};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum WaypointKind {
    #[default]
    Major,
    /// May be left out of optimization and threaded into the route afterwards.
    Minor,
}

/// A named point that must be visited exactly once.
///
/// Identity is the name. Coordinates never change after construction; the
/// distance cache only grows. Waypoints are shared between solver threads as
/// `Arc<Waypoint>`, so the cache sits behind its own lock.
pub struct Waypoint {
    name: Arc<str>,
    label: String,
    kind: WaypointKind,
    coords: Coords,
    known: RwLock<HashMap<Arc<str>, f64>>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, coords: Coords) -> Self {
        let name: String = name.into();
        Self {
            label: name.clone(),
            name: Arc::from(name),
            kind: WaypointKind::Major,
            coords,
            known: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !label.trim().is_empty() {
            self.label = label;
        }
        self
    }

    pub fn with_kind(mut self, kind: WaypointKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label as shown in reports; minor waypoints carry a `_` prefix.
    pub fn display_label(&self) -> String {
        match self.kind {
            WaypointKind::Major => self.label.clone(),
            WaypointKind::Minor => format!("{MINOR_MARKER}{}", self.label),
        }
    }

    pub fn kind(&self) -> WaypointKind {
        self.kind
    }

    pub fn is_minor(&self) -> bool {
        self.kind == WaypointKind::Minor
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Distance to `other`, served from either side's cache when one of them
    /// has already computed it. A fresh value is stored on both sides because
    /// later branches may query the pair in either order.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        if self.name == other.name {
            return self.coords.dist(&other.coords);
        }
        if let Some(d) = self.known_distance_to(other) {
            return d;
        }
        if let Some(d) = other.known_distance_to(self) {
            return d;
        }

        let d = self.coords.dist(&other.coords);
        self.store_distance_to(other, d);
        other.store_distance_to(self, d);
        d
    }

    pub fn known_distance_to(&self, other: &Waypoint) -> Option<f64> {
        self.known.read().get(&other.name).copied()
    }

    /// Number of distances this waypoint has cached.
    pub fn known_len(&self) -> usize {
        self.known.read().len()
    }

    fn store_distance_to(&self, other: &Waypoint, value: f64) {
        self.known
            .write()
            .entry(Arc::clone(&other.name))
            .or_insert(value);
    }
}

impl PartialEq for Waypoint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Waypoint {}

impl fmt::Debug for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waypoint")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("coords", &self.coords)
            .finish()
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.coords)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::{Waypoint, WaypointKind};
    use crate::Coords;

    fn wp(name: &str, x: f64, y: f64, z: f64) -> Waypoint {
        Waypoint::new(name, Coords::new(x, y, z))
    }

    #[test]
    fn distance_is_stored_on_both_sides() {
        let a = wp("a", 0.0, 0.0, 0.0);
        let b = wp("b", 3.0, 4.0, 0.0);

        assert!(a.known_distance_to(&b).is_none());
        let d = a.distance_to(&b);

        assert_eq!(d, 5.0);
        assert_eq!(a.known_distance_to(&b), Some(5.0));
        assert_eq!(b.known_distance_to(&a), Some(5.0));
    }

    #[test]
    fn repeated_lookups_return_identical_values() {
        let a = wp("a", 0.1, 0.2, 0.3);
        let b = wp("b", -7.7, 13.1, 2e4);

        let first = a.distance_to(&b);
        for _ in 0..10 {
            assert_eq!(a.distance_to(&b).to_bits(), first.to_bits());
            assert_eq!(b.distance_to(&a).to_bits(), first.to_bits());
        }
        assert_eq!(a.known_len(), 1);
        assert_eq!(b.known_len(), 1);
    }

    #[test]
    fn zero_distances_are_cached_like_any_other() {
        let a = wp("a", 1.0, 1.0, 1.0);
        let b = wp("b", 1.0, 1.0, 1.0);
        assert_eq!(a.distance_to(&b), 0.0);
        assert_eq!(b.known_distance_to(&a), Some(0.0));
    }

    #[test]
    fn self_distance_does_not_touch_the_cache() {
        let a = wp("a", 1.0, 2.0, 3.0);
        assert_eq!(a.distance_to(&a), 0.0);
        assert_eq!(a.known_len(), 0);
    }

    #[test]
    fn concurrent_queries_agree() {
        let points: Vec<Arc<Waypoint>> = (0..16)
            .map(|i| wp(&format!("p{i}"), i as f64, (i * i) as f64, -(i as f64)).shared())
            .collect();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let points = points.clone();
                thread::spawn(move || {
                    let mut out = Vec::new();
                    for (i, a) in points.iter().enumerate() {
                        for b in points.iter().skip(i + 1) {
                            let d = if t % 2 == 0 {
                                a.distance_to(b)
                            } else {
                                b.distance_to(a)
                            };
                            out.push(d.to_bits());
                        }
                    }
                    out
                })
            })
            .collect();

        let results: Vec<Vec<u64>> = handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert!(points.iter().all(|p| p.known_len() == 15));
    }

    #[test]
    fn minor_waypoints_get_prefixed_labels() {
        let a = wp("Juenae OX-U e2-8852", 0.0, 0.0, 0.0)
            .with_label("Hengist Nebula")
            .with_kind(WaypointKind::Minor);
        assert!(a.is_minor());
        assert_eq!(a.display_label(), "_Hengist Nebula");

        let b = wp("Sagittarius A*", 0.0, 0.0, 0.0).with_label("  ");
        assert_eq!(b.display_label(), "Sagittarius A*");
    }
}
