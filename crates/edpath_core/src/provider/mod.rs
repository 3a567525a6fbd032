//! Coordinate lookup for waypoint names.

mod cached;
mod edsm;
mod table;

use crate::{
    Coords, Result, cache::FileCache, constants::SYSTEMS_NAMESPACE, io::options::SolverOptions,
};

pub use cached::CachedSource;
pub use edsm::{EdsmClient, SystemFetcher, SystemRecord};
pub use table::CoordinateTable;

/// Resolves a waypoint name to its coordinates.
///
/// Fails with [`Error::NotFound`](crate::Error::NotFound) when the name is
/// unknown and with [`Error::DataMismatch`](crate::Error::DataMismatch) when
/// the record found belongs to another name.
pub trait CoordinateSource: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Coords>;
}

impl<S: CoordinateSource + ?Sized> CoordinateSource for &S {
    fn resolve(&self, name: &str) -> Result<Coords> {
        (**self).resolve(name)
    }
}

impl<S: CoordinateSource + ?Sized> CoordinateSource for Box<S> {
    fn resolve(&self, name: &str) -> Result<Coords> {
        (**self).resolve(name)
    }
}

/// The `--coords` table when given, otherwise EDSM behind the file cache.
pub fn from_options(options: &SolverOptions) -> Result<Box<dyn CoordinateSource>> {
    if let Some(path) = options.coords_path() {
        return Ok(Box::new(CoordinateTable::from_file(path)?));
    }
    let cache = FileCache::new(options.cache_root()).namespace(SYSTEMS_NAMESPACE);
    Ok(Box::new(CachedSource::new(
        EdsmClient::new(options.request_delay())?,
        cache,
    )))
}
