/// Number of leading hash characters used as the cache sub-directory.
pub(crate) const CACHE_DIR_CHARS: usize = 2;

/// Default root of the on-disk cache, relative to the working directory.
pub(crate) const DEFAULT_CACHE_DIR: &str = ".edpathcache";

/// Memo entries live under this sub-directory of the cache root.
pub(crate) const MEMO_NAMESPACE: &str = "memo";

/// Coordinate responses live under this sub-directory of the cache root.
pub(crate) const SYSTEMS_NAMESPACE: &str = "systems";

pub(crate) const EDSM_SYSTEM_API: &str = "https://www.edsm.net/api-v1/system";
pub(crate) const HTTP_TIMEOUT_SECS: u64 = 30;

/// Separator between identities inside a sub-problem signature.
pub(crate) const SIGNATURE_SEPARATOR: char = '\u{1f}';

/// Minor waypoints are written with this marker before or after the name.
pub(crate) const MINOR_MARKER: char = '_';

/// Largest offset tried on either side of the split midpoint.
pub(crate) const MAX_SPLIT_WINDOW: usize = 3;

/// Tolerance for float comparisons in consistency checks.
pub(crate) const LENGTH_EPSILON: f64 = 1e-6;
