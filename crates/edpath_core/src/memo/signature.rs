use std::{fmt, sync::Arc};

use crate::{Waypoint, constants::SIGNATURE_SEPARATOR};

/// Canonical key of a sub-problem: start, finish and the interior identities in
/// lexicographic order. Any ordering of the same interior set yields the same
/// signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn new(start: &Waypoint, interior: &[Arc<Waypoint>], finish: &Waypoint) -> Self {
        Self::from_names(
            start.name(),
            interior.iter().map(|wp| wp.name()),
            finish.name(),
        )
    }

    fn from_names<'a>(
        start: &str,
        interior: impl IntoIterator<Item = &'a str>,
        finish: &str,
    ) -> Self {
        let mut names: Vec<&str> = interior.into_iter().collect();
        names.sort_unstable();

        let capacity = start.len()
            + finish.len()
            + names.iter().map(|n| n.len() + 1).sum::<usize>()
            + 1;
        let mut key = String::with_capacity(capacity);
        key.push_str(start);
        key.push(SIGNATURE_SEPARATOR);
        key.push_str(finish);
        for name in names {
            key.push(SIGNATURE_SEPARATOR);
            key.push_str(name);
        }
        Self(key)
    }

    /// Whether `order` (endpoints included) visits exactly this sub-problem:
    /// same start, same finish, same interior set.
    pub fn matches_order(&self, order: &[String]) -> bool {
        let [start, interior @ .., finish] = order else {
            return false;
        };
        *self == Self::from_names(start, interior.iter().map(String::as_str), finish)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of interior waypoints encoded in the signature.
    pub fn interior_len(&self) -> usize {
        self.0.matches(SIGNATURE_SEPARATOR).count().saturating_sub(1)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.split(SIGNATURE_SEPARATOR);
        let start = parts.next().unwrap_or_default();
        let finish = parts.next().unwrap_or_default();
        let interior: Vec<&str> = parts.collect();
        write!(f, "{start} -> [{}] -> {finish}", interior.join(", "))
    }
}
