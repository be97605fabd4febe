use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Diagnostic counters updated by the producer, readable without locking.
#[derive(Debug, Default)]
pub struct Counters {
    frames_ok: AtomicU64,
    frames_bad_terminator: AtomicU64,
    frames_bad_decode: AtomicU64,
    samples_flagged: AtomicU64,
    clock_substituted: AtomicU64,
    bytes_discarded: AtomicU64,
}

impl Counters {
    pub fn count_frame_ok(&self) {
        self.frames_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_bad_terminator(&self) {
        self.frames_bad_terminator.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_bad_decode(&self) {
        self.frames_bad_decode.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_flagged(&self) {
        self.samples_flagged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_clock_substituted(&self) {
        self.clock_substituted.fetch_add(1, Ordering::Relaxed);
    }

    /// Framer totals are cumulative, so this is a store, not an add.
    pub fn set_bytes_discarded(&self, total: u64) {
        self.bytes_discarded.store(total, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> IngestStats {
        IngestStats {
            frames_ok: self.frames_ok.load(Ordering::Relaxed),
            frames_bad_terminator: self.frames_bad_terminator.load(Ordering::Relaxed),
            frames_bad_decode: self.frames_bad_decode.load(Ordering::Relaxed),
            samples_flagged: self.samples_flagged.load(Ordering::Relaxed),
            clock_substituted: self.clock_substituted.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the ingest counters for diagnostic display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Frames that decoded and were appended.
    pub frames_ok: u64,
    /// Frames dropped because the end marker was missing.
    pub frames_bad_terminator: u64,
    /// Frames dropped because the payload failed to decode.
    pub frames_bad_decode: u64,
    /// Appended samples with out-of-range fields.
    pub samples_flagged: u64,
    /// Appended samples whose timestamp is the arrival time.
    pub clock_substituted: u64,
    /// Bytes skipped while searching for a start marker.
    pub bytes_discarded: u64,
}

impl IngestStats {
    /// Frames seen, good or bad.
    pub fn frames_total(&self) -> u64 {
        self.frames_ok + self.frames_bad_terminator + self.frames_bad_decode
    }
}
