pub mod coords;

pub use coords::Coords;
