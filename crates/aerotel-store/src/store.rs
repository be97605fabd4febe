use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use aerotel_frame::Sample;
use chrono::TimeDelta;
use tracing::trace;

use crate::stats::{Counters, IngestStats};

/// Default retention cap.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Append-only, capped, insertion-ordered sample buffer.
///
/// Cloning yields another handle to the same store. `append`, `latest` and
/// `len` hold the lock for O(1) work; snapshots copy the selected samples
/// under the lock. No lock is ever held across I/O.
#[derive(Clone)]
pub struct SampleStore {
    shared: Arc<Shared>,
}

struct Shared {
    samples: Mutex<VecDeque<Sample>>,
    capacity: usize,
    counters: Counters,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStore {
    /// Create a store holding at most [`DEFAULT_MAX_SAMPLES`] samples.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }

    /// Create a store holding at most `capacity` samples (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                samples: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                counters: Counters::default(),
            }),
        }
    }

    /// Append a sample, evicting the oldest when full.
    ///
    /// Samples are kept in arrival order even if timestamps go backwards.
    pub fn append(&self, sample: Sample) {
        let mut samples = self.lock();
        if samples.len() == self.shared.capacity {
            if let Some(evicted) = samples.pop_front() {
                trace!(timestamp = %evicted.timestamp, "evicted oldest sample");
            }
        }
        samples.push_back(sample);
    }

    /// Most recently appended sample.
    pub fn latest(&self) -> Option<Sample> {
        self.lock().back().cloned()
    }

    /// Samples with timestamps in `[latest - window, latest]`, in insertion
    /// order. A window too large to represent selects everything up to
    /// `latest`.
    pub fn snapshot(&self, window: Duration) -> Vec<Sample> {
        let samples = self.lock();
        let Some(latest) = samples.back() else {
            return Vec::new();
        };

        let end = latest.timestamp;
        let start = TimeDelta::from_std(window)
            .ok()
            .and_then(|window| end.checked_sub_signed(window));

        samples
            .iter()
            .filter(|s| s.timestamp <= end && start.is_none_or(|start| s.timestamp >= start))
            .cloned()
            .collect()
    }

    /// Every retained sample in insertion order.
    pub fn snapshot_all(&self) -> Vec<Sample> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Retention cap.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Ingest counters, for the producer to update.
    pub fn counters(&self) -> &Counters {
        &self.shared.counters
    }

    /// Copy of the ingest counters.
    pub fn stats(&self) -> IngestStats {
        self.shared.counters.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        // A panicking reader cannot leave the deque half-written.
        self.shared
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStore")
            .field("len", &self.len())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}
