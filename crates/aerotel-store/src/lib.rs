//! Sample retention for the visualisation window.
//!
//! A single [`SampleStore`] handle is shared between the producer (which
//! appends) and any number of consumers (which take snapshots). Retention is
//! a hard cap; time windows are applied at query time so a consumer may widen
//! its window retroactively.

pub mod stats;
pub mod store;

pub use stats::{Counters, IngestStats};
pub use store::{SampleStore, DEFAULT_MAX_SAMPLES};
