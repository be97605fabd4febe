use aerotel_frame::FramingError;
use aerotel_transport::TransportError;

/// Unrecoverable ingestion failures.
///
/// Corrupt frames and end-of-stream are not errors at this layer; they are
/// counted or reported as a [`crate::StopReason`].
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The byte source failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level failure other than a bad terminator or closure.
    #[error("frame error: {0}")]
    Frame(FramingError),
}

impl From<FramingError> for IngestError {
    fn from(err: FramingError) -> Self {
        match err {
            FramingError::Transport(err) => Self::Transport(err),
            other => Self::Frame(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
