use std::io::IsTerminal;

use aerotel_frame::Sample;
use aerotel_ingest::IngestSummary;
use aerotel_store::IngestStats;
use aerotel_transport::PortInfo;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Min / max / mean of one plotted quantity over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Series {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Series {
    fn over(values: impl Iterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values.filter(|v| v.is_finite()) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

/// Text rendition of what a dashboard would plot for one window.
#[derive(Debug, Serialize)]
pub struct WindowReport {
    pub kind: &'static str,
    pub window_secs: u64,
    pub samples: usize,
    pub latest: Option<Sample>,
    pub pm1: Option<Series>,
    pub pm25: Option<Series>,
    pub pm10: Option<Series>,
    pub temp: Option<Series>,
    pub humidity: Option<Series>,
    pub altitude: Option<Series>,
    pub stats: IngestStats,
}

impl WindowReport {
    pub fn new(window_secs: u64, window: &[Sample], stats: IngestStats) -> Self {
        let series = |field: fn(&Sample) -> f32| Series::over(window.iter().map(|s| field(s) as f64));
        Self {
            kind: "window",
            window_secs,
            samples: window.len(),
            latest: window.last().cloned(),
            pm1: series(|s| s.pm1),
            pm25: series(|s| s.pm25),
            pm10: series(|s| s.pm10),
            temp: series(|s| s.temp),
            humidity: series(|s| s.humidity),
            altitude: series(|s| s.altitude),
            stats,
        }
    }
}

pub fn print_window(report: &WindowReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SERIES", "MIN", "MAX", "MEAN"]);
            for (name, series) in [
                ("PM1 [µg/m³]", report.pm1),
                ("PM2.5 [µg/m³]", report.pm25),
                ("PM10 [µg/m³]", report.pm10),
                ("Temp [°C]", report.temp),
                ("Hum [%]", report.humidity),
                ("Altitude [m]", report.altitude),
            ] {
                match series {
                    Some(s) => table.add_row(vec![
                        name.to_string(),
                        format!("{:.2}", s.min),
                        format!("{:.2}", s.max),
                        format!("{:.2}", s.mean),
                    ]),
                    None => table.add_row(vec![name, "-", "-", "-"]),
                };
            }
            println!(
                "window {}s: {} samples (ok={} bad_terminator={} bad_decode={})",
                report.window_secs,
                report.samples,
                report.stats.frames_ok,
                report.stats.frames_bad_terminator,
                report.stats.frames_bad_decode
            );
            println!("{table}");
            if let Some(latest) = &report.latest {
                println!("latest: {}", sample_line(latest));
            }
        }
        OutputFormat::Pretty => match &report.latest {
            Some(latest) => println!(
                "[{} in {}s] {}",
                report.samples,
                report.window_secs,
                sample_line(latest)
            ),
            None => println!("[0 in {}s] waiting for data", report.window_secs),
        },
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    kind: &'static str,
    #[serde(flatten)]
    summary: &'a IngestSummary,
    stored: usize,
}

pub fn print_summary(summary: &IngestSummary, stored: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SummaryOutput {
            kind: "summary",
            summary,
            stored,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            let stats = &summary.stats;
            println!("Ingest summary:");
            println!("  Stopped:          {:?}", summary.reason);
            println!("  Bytes read:       {}", summary.bytes_read);
            println!("  Bytes discarded:  {}", stats.bytes_discarded);
            println!("  Frames ok:        {}", stats.frames_ok);
            println!("  Bad terminator:   {}", stats.frames_bad_terminator);
            println!("  Bad decode:       {}", stats.frames_bad_decode);
            println!("  Out of range:     {}", stats.samples_flagged);
            println!("  Clock substitute: {}", stats.clock_substituted);
            println!("  Samples stored:   {stored}");
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    #[derive(Serialize)]
    struct PortOutput<'a> {
        name: &'a str,
        kind: &'a str,
        description: Option<&'a str>,
    }

    match format {
        OutputFormat::Json => {
            let out: Vec<PortOutput<'_>> = ports
                .iter()
                .map(|p| PortOutput {
                    name: &p.name,
                    kind: &p.kind,
                    description: p.description.as_deref(),
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE", "DESCRIPTION"]);
            for p in ports {
                table.add_row(vec![
                    p.name.clone(),
                    p.kind.clone(),
                    p.description.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for p in ports {
                match &p.description {
                    Some(desc) => println!("{} ({}, {desc})", p.name, p.kind),
                    None => println!("{} ({})", p.name, p.kind),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SynthReport {
    pub kind: &'static str,
    pub path: String,
    pub frames: u64,
    pub bytes: u64,
}

pub fn print_synth(report: &SynthReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "wrote {} frames ({} bytes) to {}",
            report.frames, report.bytes, report.path
        ),
    }
}

pub fn sample_line(s: &Sample) -> String {
    let clock = if s.clock_substituted { " (arrival)" } else { "" };
    format!(
        "{}{clock} pm1={:.1} pm2.5={:.1} pm10={:.1} temp={:.1}°C hum={:.1}% alt={:.1}m lat={:.5} lon={:.5} hdg={:.1}",
        s.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
        s.pm1,
        s.pm25,
        s.pm10,
        s.temp,
        s.humidity,
        s.altitude,
        s.latitude,
        s.longitude,
        s.heading
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
