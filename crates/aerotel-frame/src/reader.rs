use aerotel_transport::{ByteSource, ReadOutcome};
use bytes::BytesMut;
use tracing::debug;

use crate::codec::FRAME_SIZE;
use crate::deframe::{Deframed, Deframer, Frame};
use crate::error::{FramingError, Result};

const READ_CHUNK_SIZE: usize = 4 * FRAME_SIZE;

/// Reads frames from a [`ByteSource`].
///
/// Handles partial reads and read timeouts internally. The source is owned
/// exclusively by the framer.
pub struct Framer<S> {
    source: S,
    buf: BytesMut,
    deframer: Deframer,
}

impl<S: ByteSource> Framer<S> {
    /// Create a framer in the SEARCH state.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            deframer: Deframer::new(),
        }
    }

    /// Read the next well-formed frame (blocking).
    ///
    /// Source timeouts are retried. Returns `Err(FramingError::BadTerminator)`
    /// for a corrupt frame; the framer has already resynchronised and the
    /// next call continues with the following bytes. Returns
    /// `Err(FramingError::Closed)` at end-of-stream.
    pub fn next_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.poll_frame()? {
                return Ok(frame);
            }
        }
    }

    /// Like [`Framer::next_frame`], but returns `Ok(None)` when a source read
    /// times out so the caller can check for shutdown. Framer state is kept.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            match self.deframer.push(&mut self.buf) {
                Some(Deframed::Frame(frame)) => return Ok(Some(frame)),
                Some(Deframed::BadTerminator { found, offset }) => {
                    return Err(FramingError::BadTerminator { found, offset })
                }
                None => {}
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.source.read_bytes(&mut chunk)? {
                ReadOutcome::Data(n) => self.buf.extend_from_slice(&chunk[..n]),
                ReadOutcome::TimedOut => return Ok(None),
                ReadOutcome::Closed => {
                    if self.deframer.reset() {
                        debug!("source closed mid-frame");
                    }
                    return Err(FramingError::Closed);
                }
            }
        }
    }

    /// Total bytes dropped while searching for a start byte.
    pub fn bytes_discarded(&self) -> u64 {
        self.deframer.bytes_discarded()
    }

    /// Total bytes consumed from the source.
    pub fn position(&self) -> u64 {
        self.deframer.position()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the framer and return the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}
