//! Evaluate a chart snapshot and print the derived paths, occupancy,
//! manchette layout, occurrences and frame as JSON.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spacetime_chart::snapshot::ChartSnapshot;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate a space-time chart snapshot")]
struct Args {
    /// Snapshot file, read from stdin when omitted
    snapshot: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let input = read_input(args.snapshot.as_ref())?;
    let report = ChartSnapshot::from_json(&input)?.evaluate()?;
    log::info!(
        "Evaluated {} paths and {} paced trains",
        report.paths.len(),
        report.paced_trains.len()
    );
    let output = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
