use std::{fmt, sync::atomic::Ordering, time::Duration};

use crate::memo::MemoStore;

const HISTOGRAM_BUCKETS: u64 = 10;
const BAR_WIDTH: u64 = 40;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitBucket {
    /// Inclusive hit-count range covered by the bucket.
    pub lo: u64,
    pub hi: u64,
    pub signatures: usize,
    pub time_saved: Duration,
}

/// Snapshot of memo effectiveness for end-of-run reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoReport {
    pub entries: usize,
    pub signatures: usize,
    pub reads: u64,
    pub hits: u64,
    pub misses: u64,
    pub max_hits: u64,
    pub max_misses: u64,
    pub disk_hits: u64,
    pub time_saved: Duration,
    pub histogram: Vec<HitBucket>,
}

impl MemoReport {
    pub fn from_store(store: &MemoStore) -> Self {
        let slots = store.slots();
        let counts: Vec<(u64, u64, Duration)> = slots
            .iter()
            .map(|slot| {
                (
                    slot.hits.load(Ordering::Relaxed),
                    slot.misses.load(Ordering::Relaxed),
                    slot.time_saved(),
                )
            })
            .collect();

        let max_hits = counts.iter().map(|c| c.0).max().unwrap_or(0);
        let max_misses = counts.iter().map(|c| c.1).max().unwrap_or(0);

        let mut histogram = vec![HitBucket {
            lo: 0,
            hi: 0,
            signatures: 0,
            time_saved: Duration::ZERO,
        }];
        let step = (max_hits / HISTOGRAM_BUCKETS).max(1);
        let mut lo = 1;
        while lo <= max_hits {
            histogram.push(HitBucket {
                lo,
                hi: (lo + step - 1).min(max_hits),
                signatures: 0,
                time_saved: Duration::ZERO,
            });
            lo += step;
        }
        for &(hits, _, saved) in &counts {
            let idx = if hits == 0 {
                0
            } else {
                ((hits - 1) / step + 1) as usize
            };
            if let Some(bucket) = histogram.get_mut(idx) {
                bucket.signatures += 1;
                bucket.time_saved += saved;
            }
        }

        Self {
            entries: store.len(),
            signatures: slots.len(),
            reads: store.reads(),
            hits: counts.iter().map(|c| c.0).sum(),
            misses: counts.iter().map(|c| c.1).sum(),
            max_hits,
            max_misses,
            disk_hits: store.disk_hits(),
            time_saved: counts.iter().map(|c| c.2).sum(),
            histogram,
        }
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            self.hits as f64 / self.reads as f64
        }
    }
}

impl fmt::Display for MemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "memo: entries={} signatures={} reads={} hit_ratio={:.1}%",
            self.entries,
            self.signatures,
            self.reads,
            self.hit_ratio() * 100.0
        )?;
        writeln!(
            f,
            "  hits   total={} max={} from_disk={}",
            self.hits, self.max_hits, self.disk_hits
        )?;
        writeln!(f, "  misses total={} max={}", self.misses, self.max_misses)?;

        let widest = self
            .histogram
            .iter()
            .map(|b| b.signatures)
            .max()
            .unwrap_or(0)
            .max(1) as u64;
        for bucket in &self.histogram {
            let bar = (bucket.signatures as u64 * BAR_WIDTH).div_ceil(widest) as usize;
            writeln!(
                f,
                "  {:>6}..{:<6} {:>7} {:<width$} saved {}",
                bucket.lo,
                bucket.hi,
                bucket.signatures,
                "*".repeat(bar),
                fmt_hms(bucket.time_saved),
                width = BAR_WIDTH as usize
            )?;
        }
        write!(f, "  time saved {}", fmt_hms(self.time_saved))
    }
}

/// `H:MM:SS.mmm`
pub fn fmt_hms(d: Duration) -> String {
    let secs = d.as_secs();
    format!(
        "{}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        d.subsec_millis()
    )
}
