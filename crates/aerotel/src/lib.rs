//! Serial air-quality telemetry: framing, decoding and windowed retention.
//!
//! aerotel reads a UART sensor payload (particulates, temperature, humidity,
//! GPS position, altitude, timestamp), locates `<…>` frames in the noisy byte
//! stream, decodes the fixed 67-byte record and keeps a bounded history that
//! a dashboard can pull once per tick.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte sources (serial link, capture replay)
//! - [`frame`]: Start/end-marker framing and record decoding
//! - [`store`]: Capped, time-windowed sample store (behind `ingest` feature)
//! - [`ingest`]: Producer loop from source to store (behind `ingest` feature)

/// Re-export transport types.
pub mod transport {
    pub use aerotel_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use aerotel_frame::*;
}

/// Re-export store types (requires `ingest` feature).
#[cfg(feature = "ingest")]
pub mod store {
    pub use aerotel_store::*;
}

/// Re-export ingest types (requires `ingest` feature).
#[cfg(feature = "ingest")]
pub mod ingest {
    pub use aerotel_ingest::*;
}
