use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use aerotel_ingest::Ingestor;
use aerotel_store::SampleStore;
use aerotel_transport::{SerialConfig, SerialSource};
use tracing::info;

use crate::cmd::{ingest_config, parse_capacity, parse_duration, WatchArgs};
use crate::exit::{ingest_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_summary, print_window, OutputFormat, WindowReport};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let window = parse_duration(&args.window)?;
    let tick = parse_duration(&args.tick)?;
    let config = SerialConfig {
        baud_rate: args.baud,
        read_timeout: parse_duration(&args.timeout)?,
    };
    let capacity = parse_capacity(args.capacity)?;

    let source =
        SerialSource::open(&args.port, &config).map_err(|err| transport_error("open failed", err))?;
    let store = SampleStore::with_capacity(capacity);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let producer = Ingestor::with_config(source, store.clone(), ingest_config(args.arrival_fallback))
        .spawn(running.clone());

    let mut ticks = 0u64;
    while running.load(Ordering::SeqCst) && !producer.is_finished() {
        if !sleep_while_running(tick, &running) {
            break;
        }
        let report = WindowReport::new(window.as_secs(), &store.snapshot(window), store.stats());
        print_window(&report, format);

        ticks = ticks.saturating_add(1);
        if args.ticks.is_some_and(|limit| ticks >= limit) {
            break;
        }
    }

    running.store(false, Ordering::SeqCst);
    info!(ticks, "stopping producer");
    let summary = producer
        .join()
        .map_err(|_| CliError::new(INTERNAL, "producer thread panicked"))?
        .map_err(|err| ingest_error("ingest failed", err))?;

    print_summary(&summary, store.len(), format);
    Ok(SUCCESS)
}

/// Sleep for `total`, returning early with `false` once `running` clears.
fn sleep_while_running(total: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(POLL_INTERVAL));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
