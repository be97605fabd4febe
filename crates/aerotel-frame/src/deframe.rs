use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{END_BYTE, RECORD_SIZE, START_BYTE};

/// A well-formed frame payload located in the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Exactly [`RECORD_SIZE`] bytes.
    pub payload: Bytes,
    /// Stream offset of the frame's start byte.
    pub offset: u64,
}

/// Result of feeding bytes to a [`Deframer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deframed {
    /// A complete frame with a valid terminator.
    Frame(Frame),
    /// A payload was read but the terminator was `found` instead of `0x3E`.
    BadTerminator { found: u8, offset: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Search,
    Read,
    Terminate,
}

/// Start/end-marker state machine, independent of any I/O.
///
/// ```text
/// SEARCH    --0x3C-->  READ       (reset payload)
/// SEARCH    --other->  SEARCH     (discard)
/// READ      --any--->  READ       (append until RECORD_SIZE bytes)
/// TERMINATE --0x3E-->  SEARCH     (emit frame)
/// TERMINATE --other->  SEARCH     (emit bad terminator, byte not consumed)
/// ```
///
/// A `0x3C` inside the payload is not a resync point: once READ is entered
/// exactly [`RECORD_SIZE`] bytes are taken before the terminator check.
#[derive(Debug)]
pub struct Deframer {
    state: State,
    payload: BytesMut,
    /// Stream offset of the next unconsumed byte.
    position: u64,
    frame_start: u64,
    discarded: u64,
}

impl Default for Deframer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deframer {
    pub fn new() -> Self {
        Self {
            state: State::Search,
            payload: BytesMut::with_capacity(RECORD_SIZE),
            position: 0,
            frame_start: 0,
            discarded: 0,
        }
    }

    /// Consume bytes from `src` until a frame event occurs or `src` is empty.
    ///
    /// Bytes that belong to the next frame are left in `src`.
    pub fn push(&mut self, src: &mut BytesMut) -> Option<Deframed> {
        while !src.is_empty() {
            match self.state {
                State::Search => match src.iter().position(|&b| b == START_BYTE) {
                    Some(idx) => {
                        self.skip(src, idx);
                        self.frame_start = self.position;
                        self.consume(src, 1);
                        self.payload.clear();
                        self.payload.reserve(RECORD_SIZE);
                        self.state = State::Read;
                    }
                    None => {
                        let len = src.len();
                        self.skip(src, len);
                    }
                },
                State::Read => {
                    let take = (RECORD_SIZE - self.payload.len()).min(src.len());
                    self.payload.extend_from_slice(&src[..take]);
                    self.consume(src, take);
                    if self.payload.len() == RECORD_SIZE {
                        self.state = State::Terminate;
                    }
                }
                State::Terminate => {
                    self.state = State::Search;
                    let found = src[0];
                    if found == END_BYTE {
                        self.consume(src, 1);
                        let frame = Frame {
                            payload: self.payload.split().freeze(),
                            offset: self.frame_start,
                        };
                        trace!(offset = frame.offset, "frame complete");
                        return Some(Deframed::Frame(frame));
                    }

                    // The offending byte is re-examined in SEARCH so that a
                    // start marker in the terminator slot begins the next frame.
                    self.payload.clear();
                    debug!(
                        found,
                        offset = self.frame_start,
                        "bad terminator, resynchronising"
                    );
                    return Some(Deframed::BadTerminator {
                        found,
                        offset: self.frame_start,
                    });
                }
            }
        }
        None
    }

    /// Drop any partial frame and return to SEARCH.
    ///
    /// Returns `true` if a partial frame was discarded.
    pub fn reset(&mut self) -> bool {
        let was_mid_frame = self.is_mid_frame();
        if was_mid_frame {
            debug!(
                offset = self.frame_start,
                buffered = self.payload.len(),
                "discarding partial frame"
            );
        }
        self.payload.clear();
        self.state = State::Search;
        was_mid_frame
    }

    /// True while a start byte has been seen but no frame event emitted yet.
    pub fn is_mid_frame(&self) -> bool {
        self.state != State::Search
    }

    /// Total bytes dropped while searching for a start byte.
    pub fn bytes_discarded(&self) -> u64 {
        self.discarded
    }

    /// Total bytes consumed from the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn consume(&mut self, src: &mut BytesMut, n: usize) {
        src.advance(n);
        self.position += n as u64;
    }

    fn skip(&mut self, src: &mut BytesMut, n: usize) {
        if n > 0 {
            trace!(count = n, "discarding bytes outside frame");
        }
        self.consume(src, n);
        self.discarded += n as u64;
    }
}
