//! Framing and record decoding for serial sensor telemetry.
//!
//! This is the core value-add layer of aerotel. Every record on the wire is
//! framed as:
//! - A start byte `0x3C` (`<`)
//! - A fixed 67-byte little-endian payload
//! - An end byte `0x3E` (`>`)
//!
//! The framer resynchronises on noisy streams and drops corrupt frames as a
//! unit; the decoder turns a payload into a validated [`Sample`].

pub mod codec;
pub mod deframe;
pub mod error;
pub mod reader;
pub mod sample;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
pub use codec::{
    decode, decode_with_fallback, encode, encode_frame, END_BYTE, FRAME_SIZE, RECORD_SIZE,
    START_BYTE,
};
pub use deframe::{Deframed, Deframer, Frame};
pub use error::{DecodeError, EncodeError, FramingError, Result};
pub use reader::Framer;
pub use sample::{RangeFlags, Sample};
pub use writer::FrameWriter;
