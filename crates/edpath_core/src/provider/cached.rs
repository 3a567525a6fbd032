use crate::{
    Coords, Result,
    cache::FileCache,
    provider::{CoordinateSource, SystemFetcher, SystemRecord},
};

/// Serves coordinates from raw upstream responses kept in a [`FileCache`],
/// fetching only names not seen before.
///
/// A cached response that fails validation is removed so the next run asks
/// upstream again.
pub struct CachedSource<F> {
    fetcher: F,
    cache: FileCache,
}

impl<F: SystemFetcher> CachedSource<F> {
    pub fn new(fetcher: F, cache: FileCache) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    fn raw_response(&self, name: &str) -> Result<String> {
        if let Some(raw) = self.cache.read(name)? {
            log::trace!("coords: cache hit name={name:?}");
            return Ok(raw);
        }
        let raw = self.fetcher.fetch(name)?;
        self.cache.write(name, &raw)?;
        Ok(raw)
    }
}

impl<F: SystemFetcher> CoordinateSource for CachedSource<F> {
    fn resolve(&self, name: &str) -> Result<Coords> {
        let raw = self.raw_response(name)?;
        SystemRecord::parse(name, &raw).inspect_err(|err| {
            log::warn!("coords: dropping cached response name={name:?} err={err}");
            if let Err(remove_err) = self.cache.remove(name) {
                log::warn!("coords: remove failed name={name:?} err={remove_err}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::CachedSource;
    use crate::{
        Coords, Error, Result,
        cache::FileCache,
        provider::{CoordinateSource, SystemFetcher},
    };

    struct Canned {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SystemFetcher for Canned {
        fn fetch(&self, _name: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.body.to_string())
        }
    }

    #[test]
    fn second_lookup_is_served_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let source = CachedSource::new(
            Canned::new(r#"{"name":"Sol","coords":{"x":0,"y":0,"z":0}}"#),
            FileCache::new(dir.path()),
        );

        assert_eq!(source.resolve("Sol").expect("first"), Coords::new(0.0, 0.0, 0.0));
        assert!(source.resolve("sol").is_ok());
        assert_eq!(source.resolve("Sol").expect("second"), Coords::new(0.0, 0.0, 0.0));
        assert_eq!(source.fetcher.calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn mismatched_records_are_removed_from_the_cache() {
        let dir = TempDir::new().expect("temp dir");
        let source = CachedSource::new(
            Canned::new(r#"{"name":"Maia","coords":{"x":1,"y":2,"z":3}}"#),
            FileCache::new(dir.path()),
        );

        let err = source.resolve("Merope").expect_err("mismatch");
        assert!(matches!(err, Error::DataMismatch { .. }));
        assert!(source.cache().read("Merope").expect("read").is_none());
    }

    #[test]
    fn empty_records_are_not_found_and_not_kept() {
        let dir = TempDir::new().expect("temp dir");
        let source = CachedSource::new(Canned::new("[]"), FileCache::new(dir.path()));

        let err = source.resolve("Nowhere").expect_err("not found");
        assert!(matches!(err, Error::NotFound(_)));
        assert!(source.cache().read("Nowhere").expect("read").is_none());
    }
}
