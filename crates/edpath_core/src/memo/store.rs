use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    cache::FileCache,
    constants::MEMO_NAMESPACE,
    io::options::SolverOptions,
    memo::Signature,
};

const SHARDS: usize = 16;

/// Sub-problem sizes (interior waypoint counts) for which the solver consults
/// the memo. Smaller problems are cheaper to solve than to look up; larger
/// ones rarely repeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoBand {
    pub min: usize,
    pub max: usize,
}

impl MemoBand {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, interior_len: usize) -> bool {
        (self.min..=self.max).contains(&interior_len)
    }
}

/// Optimal route for a sub-problem, as persisted: the total length and the
/// full ordered identity list including both endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoEntry {
    pub length: f64,
    pub order: Vec<String>,
}

#[derive(Default)]
pub(crate) struct Slot {
    entry: OnceLock<MemoEntry>,
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    solve_nanos: AtomicU64,
}

impl Slot {
    pub(crate) fn solve_time(&self) -> Duration {
        Duration::from_nanos(self.solve_nanos.load(Ordering::Relaxed))
    }

    /// Wall-clock time not spent re-solving thanks to this entry.
    pub(crate) fn time_saved(&self) -> Duration {
        let hits = self.hits.load(Ordering::Relaxed).min(u32::MAX as u64) as u32;
        self.solve_time().saturating_mul(hits)
    }
}

/// Process-wide cache of optimal sub-problem routes keyed by [`Signature`].
///
/// Entries are write-once: storing a signature that already has an entry is
/// an error. With a [`FileCache`] attached, entries are also read from and
/// written to disk so later runs start warm.
pub struct MemoStore {
    band: MemoBand,
    shards: Vec<RwLock<HashMap<Signature, Arc<Slot>>>>,
    disk: Option<FileCache>,
    reads: AtomicU64,
    disk_hits: AtomicU64,
}

impl MemoStore {
    pub fn new(band: MemoBand, disk: Option<FileCache>) -> Self {
        Self {
            band,
            shards: (0..SHARDS).map(|_| RwLock::new(HashMap::new())).collect(),
            disk,
            reads: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
        }
    }

    pub fn in_memory(band: MemoBand) -> Self {
        Self::new(band, None)
    }

    /// Store for one run: persisted under the cache root unless `--no-persist`.
    pub fn from_options(options: &SolverOptions) -> Self {
        let disk = options
            .persist
            .then(|| FileCache::new(options.cache_root()).namespace(MEMO_NAMESPACE));
        Self::new(options.memo_band(), disk)
    }

    pub fn band(&self) -> MemoBand {
        self.band
    }

    pub fn engaged(&self, interior_len: usize) -> bool {
        self.band.contains(interior_len)
    }

    pub fn is_persistent(&self) -> bool {
        self.disk.is_some()
    }

    /// Returns the stored route for `sig`, loading it from disk on first use.
    /// Every call counts as either a hit or a miss on the signature.
    pub fn lookup(&self, sig: &Signature) -> Option<MemoEntry> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let slot = self.slot(sig);

        if let Some(entry) = slot.entry.get() {
            slot.hits.fetch_add(1, Ordering::Relaxed);
            return Some(entry.clone());
        }

        if let Some(entry) = self.load_from_disk(sig) {
            let entry = slot.entry.get_or_init(|| entry).clone();
            slot.hits.fetch_add(1, Ordering::Relaxed);
            self.disk_hits.fetch_add(1, Ordering::Relaxed);
            return Some(entry);
        }

        slot.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Records the optimal route for `sig` together with the time it took to
    /// compute. Fails with [`Error::DuplicateKey`] if `sig` already has one.
    pub fn store(&self, sig: &Signature, entry: MemoEntry, solve_time: Duration) -> Result<()> {
        let slot = self.slot(sig);
        if slot.entry.set(entry).is_err() {
            return Err(Error::DuplicateKey {
                signature: sig.to_string(),
            });
        }
        let nanos = solve_time.as_nanos().min(u64::MAX as u128) as u64;
        slot.solve_nanos.store(nanos, Ordering::Relaxed);

        if let Some(disk) = &self.disk
            && let Some(entry) = slot.entry.get()
        {
            let data = serde_json::to_string(entry)?;
            if !disk.write_new(sig.as_str(), &data)? {
                log::debug!("memo: already persisted sig={sig}");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .read()
                    .values()
                    .filter(|slot| slot.entry.get().is_some())
                    .count()
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn disk_hits(&self) -> u64 {
        self.disk_hits.load(Ordering::Relaxed)
    }

    /// Hit and miss counts recorded for `sig` so far.
    pub fn counts(&self, sig: &Signature) -> (u64, u64) {
        let shard = self.shards[shard_index(sig)].read();
        shard.get(sig).map_or((0, 0), |slot| {
            (
                slot.hits.load(Ordering::Relaxed),
                slot.misses.load(Ordering::Relaxed),
            )
        })
    }

    pub(crate) fn slots(&self) -> Vec<Arc<Slot>> {
        self.shards
            .iter()
            .flat_map(|shard| shard.read().values().cloned().collect::<Vec<_>>())
            .collect()
    }

    fn slot(&self, sig: &Signature) -> Arc<Slot> {
        let shard = &self.shards[shard_index(sig)];
        if let Some(slot) = shard.read().get(sig) {
            return Arc::clone(slot);
        }
        Arc::clone(shard.write().entry(sig.clone()).or_default())
    }

    fn load_from_disk(&self, sig: &Signature) -> Option<MemoEntry> {
        let disk = self.disk.as_ref()?;
        let raw = match disk.read(sig.as_str()) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("memo: read failed sig={sig} err={err}");
                return None;
            }
        };

        match serde_json::from_str::<MemoEntry>(&raw) {
            Ok(entry) if sig.matches_order(&entry.order) => Some(entry),
            Ok(entry) => {
                log::warn!(
                    "memo: discarding entry sig={sig} order={:?}",
                    entry.order
                );
                self.discard(disk, sig);
                None
            }
            Err(err) => {
                log::warn!("memo: discarding unreadable entry sig={sig} err={err}");
                self.discard(disk, sig);
                None
            }
        }
    }

    fn discard(&self, disk: &FileCache, sig: &Signature) {
        if let Err(err) = disk.remove(sig.as_str()) {
            log::warn!("memo: remove failed sig={sig} err={err}");
        }
    }
}

fn shard_index(sig: &Signature) -> usize {
    let mut hasher = DefaultHasher::new();
    sig.hash(&mut hasher);
    (hasher.finish() as usize) % SHARDS
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tempfile::TempDir;

    use super::{MemoBand, MemoEntry, MemoStore};
    use crate::{Coords, Error, Waypoint, cache::FileCache, memo::Signature};

    fn wp(name: &str) -> Arc<Waypoint> {
        Waypoint::new(name, Coords::new(0.0, 0.0, 0.0)).shared()
    }

    fn sample() -> (Signature, MemoEntry) {
        let sig = Signature::new(&wp("s"), &[wp("b"), wp("a")], &wp("f"));
        let entry = MemoEntry {
            length: 12.5,
            order: vec!["s".into(), "a".into(), "b".into(), "f".into()],
        };
        (sig, entry)
    }

    #[test]
    fn band_is_inclusive() {
        let band = MemoBand::new(4, 9);
        assert!(!band.contains(3));
        assert!(band.contains(4));
        assert!(band.contains(9));
        assert!(!band.contains(10));
    }

    #[test]
    fn miss_then_store_then_hit() {
        let store = MemoStore::in_memory(MemoBand::new(0, 10));
        let (sig, entry) = sample();

        assert!(store.lookup(&sig).is_none());
        store
            .store(&sig, entry.clone(), Duration::from_millis(5))
            .expect("first store");
        assert_eq!(store.lookup(&sig), Some(entry));
        assert_eq!(store.counts(&sig), (1, 1));
        assert_eq!(store.reads(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn second_store_is_a_duplicate_key() {
        let store = MemoStore::in_memory(MemoBand::new(0, 10));
        let (sig, entry) = sample();
        store
            .store(&sig, entry.clone(), Duration::ZERO)
            .expect("first store");

        let err = store
            .store(&sig, entry, Duration::ZERO)
            .expect_err("second store must fail");
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn persisted_entries_survive_a_new_store() {
        let dir = TempDir::new().expect("temp dir");
        let (sig, entry) = sample();

        let first = MemoStore::new(MemoBand::new(0, 10), Some(FileCache::new(dir.path())));
        first
            .store(&sig, entry.clone(), Duration::from_millis(1))
            .expect("store");

        let second = MemoStore::new(MemoBand::new(0, 10), Some(FileCache::new(dir.path())));
        assert_eq!(second.lookup(&sig), Some(entry));
        assert_eq!(second.disk_hits(), 1);
    }

    #[test]
    fn corrupt_files_are_discarded() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FileCache::new(dir.path());
        let (sig, _) = sample();
        cache.write(sig.as_str(), "{not json").expect("write");

        let store = MemoStore::new(MemoBand::new(0, 10), Some(cache.clone()));
        assert!(store.lookup(&sig).is_none());
        assert!(cache.read(sig.as_str()).expect("read").is_none());
    }

    #[test]
    fn entries_for_other_waypoints_are_discarded() {
        let dir = TempDir::new().expect("temp dir");
        let cache = FileCache::new(dir.path());
        let (sig, _) = sample();
        let foreign = [
            r#"{"length":1.0,"order":["s","x","y","f"]}"#,
            r#"{"length":1.0,"order":["a","s","b","f"]}"#,
            r#"{"length":1.0,"order":["s","a","b"]}"#,
        ];

        for raw in foreign {
            cache.write(sig.as_str(), raw).expect("write");
            let store = MemoStore::new(MemoBand::new(0, 10), Some(cache.clone()));
            assert!(store.lookup(&sig).is_none(), "raw={raw}");
            assert!(cache.read(sig.as_str()).expect("read").is_none(), "raw={raw}");
        }
    }

    #[test]
    fn time_saved_scales_with_hits() {
        let store = MemoStore::in_memory(MemoBand::new(0, 10));
        let (sig, entry) = sample();
        store
            .store(&sig, entry, Duration::from_millis(10))
            .expect("store");
        for _ in 0..3 {
            store.lookup(&sig);
        }
        let saved: Duration = store.slots().iter().map(|slot| slot.time_saved()).sum();
        assert_eq!(saved, Duration::from_millis(30));
    }
}
