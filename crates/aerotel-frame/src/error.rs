use aerotel_transport::TransportError;

/// Errors that can occur while locating frames in a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// A full payload was read but the byte after it was not `0x3E`.
    #[error("bad frame terminator 0x{found:02X} (frame started at byte {offset})")]
    BadTerminator { found: u8, offset: u64 },

    /// The byte source reached end-of-stream. Any partial frame was discarded.
    #[error("byte source closed")]
    Closed,

    /// The byte source failed.
    #[error("byte source error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error occurred while writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sample could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Errors that can occur while decoding a payload into a sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not exactly one record long.
    #[error("payload is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    /// The in-band calendar fields do not form a valid instant.
    #[error("invalid timestamp {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
    BadTimestamp {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },

    /// A position or heading field is NaN or infinite.
    #[error("{field} is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },
}

/// Errors that can occur while encoding a sample into a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The timestamp year does not fit the 16-bit wire field.
    #[error("year {0} does not fit in the 16-bit year field")]
    YearOutOfRange(i32),
}

pub type Result<T> = std::result::Result<T, FramingError>;
