use chrono::{DateTime, Utc};
use serde::Serialize;

/// One decoded telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// PM1.0 concentration, µg/m³.
    pub pm1: f32,
    /// PM2.5 concentration, µg/m³.
    pub pm25: f32,
    /// PM10 concentration, µg/m³.
    pub pm10: f32,
    /// Total particle count across all bins.
    pub sum_bins: f32,
    /// Temperature, °C.
    pub temp: f32,
    /// Altitude above the reference level, metres.
    pub altitude: f32,
    /// Relative humidity, %.
    pub humidity: f32,
    /// Reserved channel.
    pub xtra: f32,
    /// CO₂, ppm.
    pub co2: f32,
    /// Sensor clock at capture time, UTC, whole seconds.
    pub timestamp: DateTime<Utc>,
    /// Degrees, WGS84.
    pub latitude: f64,
    /// Degrees, WGS84.
    pub longitude: f64,
    /// Degrees from north, `[0, 360)`.
    pub heading: f64,
    /// The in-band timestamp was invalid and `timestamp` is the arrival time.
    pub clock_substituted: bool,
}

impl Sample {
    /// Which fields fall outside their physical range.
    ///
    /// Out-of-range samples are kept; the flags are for display only.
    pub fn range_flags(&self) -> RangeFlags {
        RangeFlags {
            latitude: !(-90.0..=90.0).contains(&self.latitude),
            longitude: !(-180.0..=180.0).contains(&self.longitude),
            humidity: !(0.0..=100.0).contains(&self.humidity),
            heading: !(0.0..360.0).contains(&self.heading),
        }
    }
}

/// Per-field out-of-range markers for a [`Sample`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RangeFlags {
    pub latitude: bool,
    pub longitude: bool,
    pub humidity: bool,
    pub heading: bool,
}

impl RangeFlags {
    /// True if any field is out of range.
    pub fn any(&self) -> bool {
        self.latitude || self.longitude || self.humidity || self.heading
    }

    /// Names of the flagged fields.
    pub fn fields(&self) -> Vec<&'static str> {
        [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("humidity", self.humidity),
            ("heading", self.heading),
        ]
        .into_iter()
        .filter_map(|(name, flagged)| flagged.then_some(name))
        .collect()
    }
}
