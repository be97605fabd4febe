//! Byte-source abstraction for telemetry links.
//!
//! Provides a unified read interface over the places telemetry bytes come from:
//! - A UART serial link (115200 8N1 by default)
//! - A captured byte stream replayed from a file or any `Read`
//!
//! This is the lowest layer of aerotel. The framer only ever sees a
//! [`ByteSource`], so tests and replays never touch real hardware.

pub mod error;
pub mod replay;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use replay::ReplaySource;
pub use serial::{list_ports, PortInfo, SerialConfig, SerialSource};
pub use traits::{ByteSource, ReadOutcome};
