//! Shortest open routes through 3D waypoints with a fixed start and finish.
//! Exact branch-and-bound for small interiors, an axial split heuristic for
//! larger ones, and a persistent memo of solved sub-problems.

pub mod algo;
pub mod cache;
mod constants;
mod error;
mod geo;
pub mod io;
pub mod logging;
pub mod memo;
mod path;
pub mod provider;
pub mod report;
mod waypoint;

pub use algo::{Route, SearchStats, SolveConfig, Solver};
pub use error::{Error, Result};
pub use geo::Coords;
pub use io::{
    input::{WaypointEntry, WaypointResolver, parse_waypoint_list, read_waypoint_list},
    options::{SearchMode, SolverOptions},
};
pub use memo::{MemoReport, MemoStore};
pub use path::{WaypointPath, order_length};
pub use report::RouteReport;
pub use waypoint::{Waypoint, WaypointKind};
