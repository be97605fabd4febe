use std::fs::File;
use std::io::BufWriter;
use std::time::Duration;

use aerotel_frame::{FrameWriter, Sample, START_BYTE};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use tracing::{debug, info};

use crate::cmd::{parse_duration, SynthArgs};
use crate::exit::{framing_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_synth, OutputFormat, SynthReport};

// Frankfurt am Main, the default flight origin.
const ORIGIN_LAT: f64 = 50.1109;
const ORIGIN_LON: f64 = 8.6821;

pub fn run(args: SynthArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let start = match &args.start {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| CliError::new(USAGE, format!("invalid --start {raw}: {err}")))?,
        None => Utc::now(),
    };
    let start = start.with_nanosecond(0).unwrap_or(start);

    let file = File::create(&args.path)
        .map_err(|err| io_error(&format!("create failed ({})", args.path.display()), err))?;
    let mut writer = FrameWriter::new(BufWriter::new(file));
    let mut bytes = 0u64;
    let mut noise = Noise::new(u64::from(args.count));

    for index in 0..args.count {
        if args.noise {
            let junk = noise.next_burst();
            writer
                .write_raw(&junk)
                .map_err(|err| framing_error("synth failed", err))?;
            bytes += junk.len() as u64;
        }
        let sample = synth_sample(index, start, interval)?;
        writer
            .write_sample(&sample)
            .map_err(|err| framing_error("synth failed", err))?;
        bytes += aerotel_frame::FRAME_SIZE as u64;
        debug!(index, timestamp = %sample.timestamp, "frame written");
    }
    writer
        .flush()
        .map_err(|err| framing_error("synth failed", err))?;

    info!(frames = writer.frames_written(), bytes, path = %args.path.display(), "capture written");
    print_synth(
        &SynthReport {
            kind: "synth",
            path: args.path.display().to_string(),
            frames: writer.frames_written(),
            bytes,
        },
        format,
    );
    Ok(SUCCESS)
}

/// Deterministic, plausible sample `index` of a slow flight leg.
pub(crate) fn synth_sample(index: u32, start: DateTime<Utc>, interval: Duration) -> CliResult<Sample> {
    let offset = interval
        .checked_mul(index)
        .and_then(|d| TimeDelta::from_std(d).ok())
        .and_then(|d| start.checked_add_signed(d))
        .ok_or_else(|| CliError::new(USAGE, "synthetic timestamps overflow"))?;
    let timestamp = offset.with_nanosecond(0).unwrap_or(offset);

    let t = f64::from(index);
    let phase = (t / 20.0).sin() as f32;
    Ok(Sample {
        pm1: 4.0 + 2.0 * phase,
        pm25: 7.0 + 3.0 * phase,
        pm10: 12.0 + 4.0 * phase,
        sum_bins: 150.0 + 40.0 * phase,
        temp: 18.0 - 0.01 * index.min(1_000) as f32,
        altitude: 120.0 + 0.5 * index.min(1_000) as f32,
        humidity: 55.0 + 10.0 * phase,
        xtra: 0.0,
        co2: 415.0 + 5.0 * phase,
        timestamp,
        latitude: ORIGIN_LAT + t * 1e-5,
        longitude: ORIGIN_LON + t * 2e-5,
        heading: (t * 3.0) % 360.0,
        clock_substituted: false,
    })
}

/// Line noise that never contains a start byte, so it only exercises
/// resynchronisation and never forges a frame.
pub(crate) struct Noise {
    state: u64,
}

impl Noise {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u8(&mut self) -> u8 {
        // xorshift64
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 24) as u8
    }

    pub(crate) fn next_burst(&mut self) -> Vec<u8> {
        let len = usize::from(self.next_u8() % 8);
        (0..len)
            .map(|_| match self.next_u8() {
                START_BYTE => 0x00,
                byte => byte,
            })
            .collect()
    }
}
