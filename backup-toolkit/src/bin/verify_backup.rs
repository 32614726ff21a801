//! verify-backup - Check the shape of every manifest in a directory.

use backup_toolkit::{jobs, utils};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Verify backup manifests", long_about = None)]
struct Args {
    /// Directory holding *.manifest.json files (created if missing)
    #[arg(long, value_name = "DIR", default_value = "./backups/manifests")]
    manifests_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    utils::logger::init(&args.log_level)?;

    let report = jobs::verify(&args.manifests_dir);
    println!("{}", report);

    Ok(ExitCode::from(report.exit_code()))
}
