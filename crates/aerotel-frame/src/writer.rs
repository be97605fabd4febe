use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, FRAME_SIZE};
use crate::error::{FramingError, Result};
use crate::sample::Sample;

/// Writes framed samples to any `Write` stream.
///
/// Used to produce captures for replay and to drive framers in tests.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    frames_written: u64,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_SIZE),
            frames_written: 0,
        }
    }

    /// Encode and write one complete frame.
    pub fn write_sample(&mut self, sample: &Sample) -> Result<()> {
        self.buf.clear();
        encode_frame(sample, &mut self.buf)?;
        let frame = self.buf.split();
        self.write_all(&frame)?;
        self.buf.unsplit(frame);
        self.frames_written += 1;
        Ok(())
    }

    /// Write bytes verbatim, e.g. line noise between frames.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FramingError::Io(err)),
            }
        }
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(FramingError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FramingError::Io(err)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::codec::{decode, END_BYTE, START_BYTE};

    fn sample(pm1: f32) -> Sample {
        Sample {
            pm1,
            pm25: 2.0,
            pm10: 3.0,
            sum_bins: 10.0,
            temp: 20.0,
            altitude: 100.0,
            humidity: 50.0,
            xtra: 0.0,
            co2: 400.0,
            timestamp: Utc.with_ymd_and_hms(2023, 5, 5, 10, 0, 0).unwrap(),
            latitude: 48.0,
            longitude: 11.0,
            heading: 45.0,
            clock_substituted: false,
        }
    }

    #[test]
    fn writes_complete_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.write_sample(&sample(1.0)).unwrap();
        writer.flush().unwrap();

        let wire = writer.into_inner().into_inner();
        assert_eq!(wire.len(), FRAME_SIZE);
        assert_eq!(wire[0], START_BYTE);
        assert_eq!(wire[FRAME_SIZE - 1], END_BYTE);
        assert_eq!(decode(&wire[1..FRAME_SIZE - 1]).unwrap(), sample(1.0));
    }

    #[test]
    fn raw_bytes_are_written_verbatim() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.write_raw(&[0xFF, 0xFE]).unwrap();
        writer.write_sample(&sample(2.0)).unwrap();

        assert_eq!(writer.frames_written(), 1);
        let wire = writer.into_inner().into_inner();
        assert_eq!(&wire[..3], &[0xFF, 0xFE, START_BYTE]);
        assert_eq!(wire.len(), 2 + FRAME_SIZE);
    }

    #[test]
    fn zero_length_write_is_closed() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FrameWriter::new(Full);
        assert!(matches!(
            writer.write_sample(&sample(1.0)),
            Err(FramingError::Closed)
        ));
    }
}
