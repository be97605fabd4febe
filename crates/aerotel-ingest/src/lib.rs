//! Telemetry ingestion: byte source to sample store.
//!
//! This is the "just works" layer. An [`Ingestor`] owns the framer and the
//! decoder, appends good samples to a shared store and accounts every
//! dropped frame in the store's counters. Consumers never see corrupt data.

pub mod config;
pub mod error;
pub mod ingestor;

pub use config::{IngestConfig, TimestampPolicy};
pub use error::{IngestError, Result};
pub use ingestor::{IngestSummary, Ingestor, Step, StopReason};
