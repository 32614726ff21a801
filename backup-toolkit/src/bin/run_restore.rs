//! run-restore - Simulate a restore from a backup manifest.

use backup_toolkit::{jobs, utils};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate a restore from a manifest", long_about = None)]
struct Args {
    /// Manifest file to restore from
    #[arg(long, value_name = "FILE")]
    manifest: PathBuf,

    /// Restore destination
    #[arg(long)]
    destination: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    utils::logger::init(&args.log_level)?;

    let report = jobs::restore(&args.manifest, &args.destination);
    println!("{}", report);

    Ok(ExitCode::from(report.exit_code()))
}
