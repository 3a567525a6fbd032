mod report;
mod signature;
mod store;

pub use report::{HitBucket, MemoReport, fmt_hms};
pub use signature::Signature;
pub use store::{MemoBand, MemoEntry, MemoStore};
