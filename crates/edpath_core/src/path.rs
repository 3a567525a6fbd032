use std::{collections::HashSet, sync::Arc};

use crate::{Error, Result, Waypoint};

/// Ordered waypoints: element 0 is the fixed start, the last element the fixed
/// finish, everything in between is the interior under optimization.
#[derive(Clone, Debug)]
pub struct WaypointPath {
    waypoints: Vec<Arc<Waypoint>>,
}

impl WaypointPath {
    /// Validates and wraps an ordered waypoint list.
    ///
    /// Rejects lists shorter than two, duplicate interior identities and
    /// interior waypoints that repeat an endpoint.
    pub fn new(waypoints: Vec<Arc<Waypoint>>) -> Result<Self> {
        if waypoints.len() < 2 {
            return Err(Error::invalid_input(format!(
                "a path needs a start and a finish, got {} waypoint(s)",
                waypoints.len()
            )));
        }

        let n = waypoints.len();
        let start = waypoints[0].name();
        let finish = waypoints[n - 1].name();
        let mut seen = HashSet::with_capacity(n);
        for wp in &waypoints[1..n - 1] {
            if wp.name() == start || wp.name() == finish {
                return Err(Error::invalid_input(format!(
                    "interior waypoint {:?} repeats an endpoint",
                    wp.name()
                )));
            }
            if !seen.insert(wp.name()) {
                return Err(Error::invalid_input(format!(
                    "waypoint {:?} appears more than once",
                    wp.name()
                )));
            }
        }

        Ok(Self { waypoints })
    }

    pub fn from_parts(
        start: Arc<Waypoint>,
        interior: impl IntoIterator<Item = Arc<Waypoint>>,
        finish: Arc<Waypoint>,
    ) -> Result<Self> {
        let mut waypoints = vec![start];
        waypoints.extend(interior);
        waypoints.push(finish);
        Self::new(waypoints)
    }

    pub fn start(&self) -> &Arc<Waypoint> {
        &self.waypoints[0]
    }

    pub fn finish(&self) -> &Arc<Waypoint> {
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn interior(&self) -> &[Arc<Waypoint>] {
        &self.waypoints[1..self.waypoints.len() - 1]
    }

    pub fn waypoints(&self) -> &[Arc<Waypoint>] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false: a path holds at least its two endpoints.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn interior_len(&self) -> usize {
        self.waypoints.len() - 2
    }

    /// Length of the path in the order it was given.
    pub fn length(&self) -> f64 {
        order_length(&self.waypoints)
    }

    /// Straight-line distance from start to finish.
    pub fn direct_length(&self) -> f64 {
        self.start().distance_to(self.finish())
    }

    /// Splits off the minor interior waypoints, keeping the relative order of
    /// both groups.
    pub fn partition_minor(&self) -> (WaypointPath, Vec<Arc<Waypoint>>) {
        let (minor, major): (Vec<_>, Vec<_>) =
            self.interior().iter().cloned().partition(|wp| wp.is_minor());

        let mut waypoints = Vec::with_capacity(major.len() + 2);
        waypoints.push(Arc::clone(self.start()));
        waypoints.extend(major);
        waypoints.push(Arc::clone(self.finish()));

        (WaypointPath { waypoints }, minor)
    }

    pub fn names(&self) -> Vec<&str> {
        self.waypoints.iter().map(|wp| wp.name()).collect()
    }
}

/// Total hop length of an ordered waypoint sequence.
pub fn order_length(order: &[Arc<Waypoint>]) -> f64 {
    order.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}
