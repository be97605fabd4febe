use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::{classify_read, ByteSource, ReadOutcome};

/// Replays a captured byte stream from any `Read`.
///
/// End of the underlying reader is reported as [`ReadOutcome::Closed`];
/// `TimedOut`/`WouldBlock` errors pass through as [`ReadOutcome::TimedOut`].
#[derive(Debug)]
pub struct ReplaySource<R> {
    inner: R,
    bytes_read: u64,
}

impl<R: Read> ReplaySource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes_read: 0,
        }
    }

    /// Total bytes handed out so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Consume the source and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl ReplaySource<File> {
    /// Open a capture file for replay.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TransportError::OpenCapture {
            path: path.to_path_buf(),
            source,
        })?;
        info!(?path, "opened capture for replay");
        Ok(Self::new(file))
    }
}

impl ReplaySource<Cursor<Vec<u8>>> {
    /// Replay an in-memory byte stream.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<R: Read> ByteSource for ReplaySource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::TimedOut);
        }
        loop {
            if let Some(outcome) = classify_read(self.inner.read(buf)) {
                if let Ok(ReadOutcome::Data(n)) = outcome {
                    self.bytes_read += n as u64;
                }
                return outcome;
            }
        }
    }
}
