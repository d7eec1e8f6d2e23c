//! Wunderground filler.
//!
//! Finds station archive records missing from Weather Underground and uploads them.

use std::error::Error;

use tracing_subscriber::EnvFilter;

use wu_fill::{fill, CmdLineArgs, FillOpts, Pws, RecordStatus, Station};

static TIME_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(ref e) = run() {
        println!("error: {}", e);

        let mut source = e.source();
        while let Some(cause) = source {
            println!("caused by: {}", cause);
            source = cause.source();
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = CmdLineArgs::matches(CmdLineArgs::new_app(
        "wufill",
        "Upload missing station archive records to Weather Underground.",
    ));

    println!(
        "Fill range is {} to {}.",
        args.begin().format(TIME_FORMAT),
        args.end().format(TIME_FORMAT)
    );

    let station = Station::new(args.station_addr());
    let pws = Pws::new(args.pws_id(), args.password());

    let opts = FillOpts {
        begin: args.begin(),
        end: args.end(),
        test: args.test(),
    };

    let report = fill(&station, &pws, &opts)?;

    println!("Found {} archive records.", report.archive_records());
    println!(
        "Found {} Wunderground observations.",
        report.remote_observations
    );

    for outcome in report
        .outcomes
        .iter()
        .filter(|o| o.status != RecordStatus::AlreadyPresent)
    {
        println!(
            "\tMissing {}: {}.",
            outcome.timestamp.format(TIME_FORMAT),
            outcome.status
        );
    }

    if args.test() {
        println!(
            "{} of {} records are missing, nothing uploaded in test mode.",
            report.missing(),
            report.archive_records()
        );
    } else {
        println!(
            "{} of {} missing records uploaded, {} failed.",
            report.uploaded(),
            report.missing(),
            report.failed()
        );
    }

    println!("Done!");
    Ok(())
}
