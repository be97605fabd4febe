use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::encode_frame;
use crate::deframe::{Deframed, Deframer};
use crate::error::FramingError;
use crate::sample::Sample;

/// `tokio_util` codec over the same state machine as [`crate::Framer`].
///
/// Bad terminators are yielded as [`Deframed::BadTerminator`] items rather
/// than errors so that a `FramedRead` stream survives line noise.
#[derive(Debug, Default)]
pub struct FrameCodec {
    deframer: Deframer,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes dropped while searching for a start byte.
    pub fn bytes_discarded(&self) -> u64 {
        self.deframer.bytes_discarded()
    }
}

impl Decoder for FrameCodec {
    type Item = Deframed;
    type Error = FramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.deframer.push(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(event) = self.decode(src)? {
            return Ok(Some(event));
        }
        self.deframer.reset();
        Ok(None)
    }
}

impl Encoder<&Sample> for FrameCodec {
    type Error = FramingError;

    fn encode(&mut self, item: &Sample, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(item, dst)?;
        Ok(())
    }
}
