use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use aerotel_frame::{decode, decode_with_fallback, Framer, FramingError, Sample};
use aerotel_store::{IngestStats, SampleStore};
use aerotel_transport::ByteSource;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{IngestConfig, TimestampPolicy};
use crate::error::Result;

/// What a single [`Ingestor::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A sample was decoded and appended.
    Appended,
    /// A frame was dropped (bad terminator or decode failure).
    Rejected,
    /// The source read timed out; nothing happened.
    Idle,
    /// The source reached end-of-stream.
    Closed,
}

/// Why the ingest loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    SourceClosed,
    Stopped,
}

/// Final state of an ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub reason: StopReason,
    pub bytes_read: u64,
    pub stats: IngestStats,
}

/// Producer loop: framer, decoder, store.
pub struct Ingestor<S> {
    framer: Framer<S>,
    store: SampleStore,
    config: IngestConfig,
}

impl<S: ByteSource> Ingestor<S> {
    /// Create an ingestor with default configuration.
    pub fn new(source: S, store: SampleStore) -> Self {
        Self::with_config(source, store, IngestConfig::default())
    }

    /// Create an ingestor with explicit configuration.
    pub fn with_config(source: S, store: SampleStore, config: IngestConfig) -> Self {
        Self {
            framer: Framer::new(source),
            store,
            config,
        }
    }

    /// Process at most one frame.
    pub fn step(&mut self) -> Result<Step> {
        let polled = self.framer.poll_frame();
        self.store
            .counters()
            .set_bytes_discarded(self.framer.bytes_discarded());

        let frame = match polled {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(Step::Idle),
            Err(FramingError::BadTerminator { found, offset }) => {
                self.store.counters().count_bad_terminator();
                warn!(found, offset, "dropping frame with bad terminator");
                return Ok(Step::Rejected);
            }
            Err(FramingError::Closed) => return Ok(Step::Closed),
            Err(err) => return Err(err.into()),
        };

        let decoded = match self.config.timestamp_policy {
            TimestampPolicy::Strict => decode(&frame.payload),
            TimestampPolicy::ArrivalFallback => decode_with_fallback(&frame.payload, Utc::now()),
        };

        match decoded {
            Ok(sample) => {
                self.accept(sample);
                Ok(Step::Appended)
            }
            Err(err) => {
                self.store.counters().count_bad_decode();
                warn!(offset = frame.offset, %err, "dropping undecodable frame");
                Ok(Step::Rejected)
            }
        }
    }

    /// Run until the source closes or `running` is cleared.
    ///
    /// `running` is checked between frames and after every read timeout, so
    /// shutdown latency is bounded by the source's read timeout.
    pub fn run(&mut self, running: &AtomicBool) -> Result<IngestSummary> {
        while running.load(Ordering::Acquire) {
            if self.step()? == Step::Closed {
                return Ok(self.finish(StopReason::SourceClosed));
            }
        }
        Ok(self.finish(StopReason::Stopped))
    }

    /// Run until the source closes.
    pub fn run_to_end(&mut self) -> Result<IngestSummary> {
        self.run(&AtomicBool::new(true))
    }

    /// The store this ingestor appends to.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Consume the ingestor and return the byte source.
    pub fn into_source(self) -> S {
        self.framer.into_inner()
    }

    fn accept(&self, sample: Sample) {
        let counters = self.store.counters();
        let flags = sample.range_flags();
        if flags.any() {
            counters.count_flagged();
            debug!(fields = ?flags.fields(), timestamp = %sample.timestamp, "sample out of range");
        }
        if sample.clock_substituted {
            counters.count_clock_substituted();
            debug!("in-band timestamp invalid, using arrival time");
        }
        counters.count_frame_ok();
        self.store.append(sample);
    }

    fn finish(&self, reason: StopReason) -> IngestSummary {
        let summary = IngestSummary {
            reason,
            bytes_read: self.framer.position(),
            stats: self.store.stats(),
        };
        info!(
            ?reason,
            frames_ok = summary.stats.frames_ok,
            frames_bad_terminator = summary.stats.frames_bad_terminator,
            frames_bad_decode = summary.stats.frames_bad_decode,
            "ingest finished"
        );
        summary
    }
}

impl<S: ByteSource + Send + 'static> Ingestor<S> {
    /// Run on a dedicated producer thread until the source closes or
    /// `running` is cleared.
    pub fn spawn(mut self, running: Arc<AtomicBool>) -> JoinHandle<Result<IngestSummary>> {
        std::thread::spawn(move || self.run(&running))
    }
}
