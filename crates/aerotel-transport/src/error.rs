use std::path::PathBuf;

/// Errors that can occur while opening or reading a byte source.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial port.
    #[error("failed to open serial port {port}: {source}")]
    OpenPort {
        port: String,
        source: serialport::Error,
    },

    /// Failed to open a capture file for replay.
    #[error("failed to open capture {path}: {source}")]
    OpenCapture {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serial port enumeration failed.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    /// An I/O error occurred on the byte source.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
