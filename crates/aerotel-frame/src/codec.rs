use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::error::{DecodeError, EncodeError};
use crate::sample::Sample;

/// Frame start marker `<`.
pub const START_BYTE: u8 = 0x3C;

/// Frame end marker `>`.
pub const END_BYTE: u8 = 0x3E;

/// Payload size: 9 × f32 + u16 + 5 × u8 + 3 × f64.
pub const RECORD_SIZE: usize = 9 * 4 + 2 + 5 + 3 * 8;

/// Size of a complete frame including both markers.
pub const FRAME_SIZE: usize = RECORD_SIZE + 2;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Raw field values in wire order, before validation.
struct RawRecord {
    pm1: f32,
    pm25: f32,
    pm10: f32,
    sum_bins: f32,
    temp: f32,
    altitude: f32,
    humidity: f32,
    xtra: f32,
    co2: f32,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    latitude: f64,
    longitude: f64,
    heading: f64,
}

impl RawRecord {
    fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != RECORD_SIZE {
            return Err(DecodeError::Length {
                expected: RECORD_SIZE,
                actual: payload.len(),
            });
        }

        let mut src = payload;
        Ok(Self {
            pm1: src.get_f32_le(),
            pm25: src.get_f32_le(),
            pm10: src.get_f32_le(),
            sum_bins: src.get_f32_le(),
            temp: src.get_f32_le(),
            altitude: src.get_f32_le(),
            humidity: src.get_f32_le(),
            xtra: src.get_f32_le(),
            co2: src.get_f32_le(),
            year: src.get_u16_le(),
            month: src.get_u8(),
            day: src.get_u8(),
            hour: src.get_u8(),
            minute: src.get_u8(),
            second: src.get_u8(),
            latitude: src.get_f64_le(),
            longitude: src.get_f64_le(),
            heading: src.get_f64_le(),
        })
    }

    fn check_finite(&self) -> Result<(), DecodeError> {
        for (field, value) in [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("heading", self.heading),
        ] {
            if !value.is_finite() {
                return Err(DecodeError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    fn timestamp(&self) -> Result<DateTime<Utc>, DecodeError> {
        let bad = || DecodeError::BadTimestamp {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        };

        if !(1..=12).contains(&self.month)
            || !(1..=31).contains(&self.day)
            || self.hour > 23
            || self.minute > 59
            || self.second > 60
        {
            return Err(bad());
        }

        let date = NaiveDate::from_ymd_opt(self.year.into(), self.month.into(), self.day.into())
            .ok_or_else(bad)?;
        // chrono encodes a leap second as :59 with a nanosecond overflow.
        let time = match self.second {
            60 => NaiveTime::from_hms_nano_opt(
                self.hour.into(),
                self.minute.into(),
                59,
                NANOS_PER_SECOND,
            ),
            second => {
                NaiveTime::from_hms_opt(self.hour.into(), self.minute.into(), second.into())
            }
        };
        let time = time.ok_or_else(bad)?;

        Ok(NaiveDateTime::new(date, time).and_utc())
    }

    fn into_sample(self, timestamp: DateTime<Utc>, clock_substituted: bool) -> Sample {
        Sample {
            pm1: self.pm1,
            pm25: self.pm25,
            pm10: self.pm10,
            sum_bins: self.sum_bins,
            temp: self.temp,
            altitude: self.altitude,
            humidity: self.humidity,
            xtra: self.xtra,
            co2: self.co2,
            timestamp,
            latitude: self.latitude,
            longitude: self.longitude,
            heading: self.heading,
            clock_substituted,
        }
    }
}

/// Decode a payload into a sample.
///
/// Payload layout, little-endian:
/// ```text
/// offset  type  field          offset  type  field
///      0  f32   pm1                36  u16   year
///      4  f32   pm25               38  u8    month
///      8  f32   pm10               39  u8    day
///     12  f32   sum_bins           40  u8    hour
///     16  f32   temp               41  u8    minute
///     20  f32   altitude           42  u8    second
///     24  f32   humidity           43  f64   latitude
///     28  f32   xtra               51  f64   longitude
///     32  f32   co2                59  f64   heading
/// ```
///
/// The decoder is pure and touches no outside state.
pub fn decode(payload: &[u8]) -> Result<Sample, DecodeError> {
    let raw = RawRecord::parse(payload)?;
    raw.check_finite()?;
    let timestamp = raw.timestamp()?;
    Ok(raw.into_sample(timestamp, false))
}

/// Decode a payload, substituting `arrival` for an invalid in-band timestamp.
///
/// The returned sample has `clock_substituted` set when the substitution
/// happened. Length and non-finite position errors still fail.
pub fn decode_with_fallback(
    payload: &[u8],
    arrival: DateTime<Utc>,
) -> Result<Sample, DecodeError> {
    let raw = RawRecord::parse(payload)?;
    raw.check_finite()?;
    match raw.timestamp() {
        Ok(timestamp) => Ok(raw.into_sample(timestamp, false)),
        Err(DecodeError::BadTimestamp { .. }) => Ok(raw.into_sample(arrival, true)),
        Err(err) => Err(err),
    }
}

/// Encode a sample into a payload.
///
/// Sub-second precision is dropped; a leap second is written as second 60.
pub fn encode(sample: &Sample) -> Result<[u8; RECORD_SIZE], EncodeError> {
    let ts = sample.timestamp;
    let year = u16::try_from(ts.year()).map_err(|_| EncodeError::YearOutOfRange(ts.year()))?;
    let second = if ts.nanosecond() >= NANOS_PER_SECOND {
        60
    } else {
        ts.second() as u8
    };

    let mut out = [0u8; RECORD_SIZE];
    let mut dst = &mut out[..];
    dst.put_f32_le(sample.pm1);
    dst.put_f32_le(sample.pm25);
    dst.put_f32_le(sample.pm10);
    dst.put_f32_le(sample.sum_bins);
    dst.put_f32_le(sample.temp);
    dst.put_f32_le(sample.altitude);
    dst.put_f32_le(sample.humidity);
    dst.put_f32_le(sample.xtra);
    dst.put_f32_le(sample.co2);
    dst.put_u16_le(year);
    dst.put_u8(ts.month() as u8);
    dst.put_u8(ts.day() as u8);
    dst.put_u8(ts.hour() as u8);
    dst.put_u8(ts.minute() as u8);
    dst.put_u8(second);
    dst.put_f64_le(sample.latitude);
    dst.put_f64_le(sample.longitude);
    dst.put_f64_le(sample.heading);
    Ok(out)
}

/// Encode a sample as a complete frame into `dst`.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────────────────────┬──────────┐
/// │ Start    │ Payload                  │ End      │
/// │ 0x3C '<' │ (67 bytes, little-endian)│ 0x3E '>' │
/// └──────────┴──────────────────────────┴──────────┘
/// ```
pub fn encode_frame(sample: &Sample, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let payload = encode(sample)?;
    dst.reserve(FRAME_SIZE);
    dst.put_u8(START_BYTE);
    dst.put_slice(&payload);
    dst.put_u8(END_BYTE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample() -> Sample {
        Sample {
            pm1: 1.5,
            pm25: 2.5,
            pm10: 3.25,
            sum_bins: 742.0,
            temp: 23.5,
            altitude: 112.0,
            humidity: 48.5,
            xtra: -1.0,
            co2: 412.0,
            timestamp: Utc.with_ymd_and_hms(2023, 7, 14, 9, 30, 5).unwrap(),
            latitude: 50.1109,
            longitude: 8.6821,
            heading: 270.5,
            clock_substituted: false,
        }
    }

    fn payload_with(edit: impl FnOnce(&mut [u8; RECORD_SIZE])) -> [u8; RECORD_SIZE] {
        let mut payload = encode(&sample()).unwrap();
        edit(&mut payload);
        payload
    }

    #[test]
    fn record_size_is_67() {
        assert_eq!(RECORD_SIZE, 67);
        assert_eq!(FRAME_SIZE, 69);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let s = sample();
        let decoded = decode(&encode(&s).unwrap()).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn fields_land_at_documented_offsets() {
        let payload = encode(&sample()).unwrap();

        assert_eq!(&payload[0..4], &1.5f32.to_le_bytes());
        assert_eq!(&payload[12..16], &742.0f32.to_le_bytes());
        assert_eq!(&payload[36..38], &2023u16.to_le_bytes());
        assert_eq!(&payload[38..43], &[7, 14, 9, 30, 5]);
        assert_eq!(&payload[43..51], &50.1109f64.to_le_bytes());
        assert_eq!(&payload[59..67], &270.5f64.to_le_bytes());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = decode(&[0u8; RECORD_SIZE - 1]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Length {
                expected: RECORD_SIZE,
                actual: RECORD_SIZE - 1
            }
        );
        assert!(matches!(
            decode(&[0u8; RECORD_SIZE + 1]),
            Err(DecodeError::Length { .. })
        ));
    }

    #[test]
    fn month_13_is_bad_timestamp() {
        let payload = payload_with(|p| p[38] = 13);
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::BadTimestamp { month: 13, .. })
        ));
    }

    #[test]
    fn impossible_calendar_date_is_bad_timestamp() {
        let payload = payload_with(|p| {
            p[38] = 2;
            p[39] = 31;
        });
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::BadTimestamp { .. })
        ));
    }

    #[test]
    fn out_of_range_clock_fields_are_rejected() {
        for (offset, value) in [(39, 0), (39, 32), (40, 24), (41, 60), (42, 61)] {
            let payload = payload_with(|p| p[offset] = value);
            assert!(
                matches!(decode(&payload), Err(DecodeError::BadTimestamp { .. })),
                "offset {offset} value {value} should be rejected"
            );
        }
    }

    #[test]
    fn leap_second_is_accepted_and_roundtrips() {
        let payload = payload_with(|p| {
            p[40] = 23;
            p[41] = 59;
            p[42] = 60;
        });
        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.timestamp.second(), 59);
        assert!(decoded.timestamp.nanosecond() >= NANOS_PER_SECOND);
        assert_eq!(encode(&decoded).unwrap(), payload);
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let payload = payload_with(|p| p[43..51].copy_from_slice(&f64::NAN.to_le_bytes()));
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::NonFinite {
                field: "latitude",
                ..
            })
        ));

        let payload = payload_with(|p| p[59..67].copy_from_slice(&f64::INFINITY.to_le_bytes()));
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::NonFinite {
                field: "heading",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_particulates_pass_through() {
        let payload = payload_with(|p| p[0..4].copy_from_slice(&f32::NAN.to_le_bytes()));
        assert!(decode(&payload).unwrap().pm1.is_nan());
    }

    #[test]
    fn out_of_range_position_is_decoded() {
        let payload = payload_with(|p| p[43..51].copy_from_slice(&123.0f64.to_le_bytes()));
        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.latitude, 123.0);
        assert!(decoded.range_flags().latitude);
    }

    #[test]
    fn fallback_substitutes_arrival_time() {
        let arrival = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let payload = payload_with(|p| p[38] = 13);

        let decoded = decode_with_fallback(&payload, arrival).unwrap();
        assert_eq!(decoded.timestamp, arrival);
        assert!(decoded.clock_substituted);
        assert_eq!(decoded.pm1, 1.5);
    }

    #[test]
    fn fallback_keeps_valid_in_band_time() {
        let arrival = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let decoded = decode_with_fallback(&encode(&sample()).unwrap(), arrival).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn fallback_still_rejects_non_finite() {
        let arrival = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let payload = payload_with(|p| {
            p[38] = 13;
            p[51..59].copy_from_slice(&f64::NEG_INFINITY.to_le_bytes());
        });
        assert!(matches!(
            decode_with_fallback(&payload, arrival),
            Err(DecodeError::NonFinite {
                field: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn encode_frame_wraps_payload_in_markers() {
        let mut buf = BytesMut::new();
        encode_frame(&sample(), &mut buf).unwrap();

        assert_eq!(buf.len(), FRAME_SIZE);
        assert_eq!(buf[0], START_BYTE);
        assert_eq!(buf[FRAME_SIZE - 1], END_BYTE);
        assert_eq!(&buf[1..FRAME_SIZE - 1], &encode(&sample()).unwrap());
    }

    #[test]
    fn encode_rejects_unrepresentable_year() {
        let mut s = sample();
        s.timestamp = Utc.with_ymd_and_hms(-5, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(encode(&s), Err(EncodeError::YearOutOfRange(-5)));
    }
}
