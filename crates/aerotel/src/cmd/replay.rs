use aerotel_ingest::Ingestor;
use aerotel_store::SampleStore;
use aerotel_transport::ReplaySource;

use crate::cmd::{ingest_config, parse_capacity, parse_duration, ReplayArgs};
use crate::exit::{ingest_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_summary, print_window, OutputFormat, WindowReport};

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let window = parse_duration(&args.window)?;
    let store = SampleStore::with_capacity(parse_capacity(args.capacity)?);
    let source =
        ReplaySource::open(&args.path).map_err(|err| transport_error("replay failed", err))?;

    let mut ingestor =
        Ingestor::with_config(source, store.clone(), ingest_config(args.arrival_fallback));
    let summary = ingestor
        .run_to_end()
        .map_err(|err| ingest_error("replay failed", err))?;

    print_summary(&summary, store.len(), format);
    let report = WindowReport::new(window.as_secs(), &store.snapshot(window), store.stats());
    print_window(&report, format);

    Ok(SUCCESS)
}
