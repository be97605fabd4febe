use std::io::{self, ErrorKind};

use crate::error::{Result, TransportError};

/// Outcome of a single read from a [`ByteSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n > 0` bytes were written to the front of the buffer.
    Data(usize),
    /// The read timeout elapsed with no data. The source is still open.
    TimedOut,
    /// The source reached end-of-stream or the link went away.
    Closed,
}

/// A blocking source of telemetry bytes.
///
/// A read may block up to the source's timeout and may return fewer bytes
/// than requested. Implementations never return `Data(0)`.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<ReadOutcome>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        (**self).read_bytes(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        (**self).read_bytes(buf)
    }
}

/// Map a `std::io::Read` result onto a [`ReadOutcome`].
///
/// Returns `None` for `Interrupted` so the caller can retry in place.
pub(crate) fn classify_read(result: io::Result<usize>) -> Option<Result<ReadOutcome>> {
    match result {
        Ok(0) => Some(Ok(ReadOutcome::Closed)),
        Ok(n) => Some(Ok(ReadOutcome::Data(n))),
        Err(err) => match err.kind() {
            ErrorKind::Interrupted => None,
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Some(Ok(ReadOutcome::TimedOut)),
            ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => Some(Ok(ReadOutcome::Closed)),
            _ => Some(Err(TransportError::Io(err))),
        },
    }
}
