//! run-backup - Write a backup manifest for a target.
//!
//! Mirrors the manifest to S3 when a bucket is configured, keeping a local
//! manifest whenever the upload is skipped or fails.

use backup_toolkit::{config::ToolkitConfig, jobs::BackupJob, metrics, remote, utils};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run backup for a target", long_about = None)]
struct Args {
    /// Target name to back up
    #[arg(long)]
    target: String,

    /// Simulate backup without contacting remote storage
    #[arg(long)]
    dry_run: bool,

    /// Metrics listen address (default: METRICS_LISTEN_ADDR or 0.0.0.0)
    #[arg(long)]
    metrics_host: Option<String>,

    /// Metrics listen port (default: METRICS_LISTEN_PORT or 8000)
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Local backup root (default: LOCAL_BACKUP_ROOT or ./backups)
    #[arg(long, value_name = "DIR")]
    local_root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = match ToolkitConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("Backup failed: {}", e);
            return Ok(ExitCode::from(backup_toolkit::jobs::EXIT_FAILURE));
        }
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    utils::logger::init(log_level)?;

    let metrics_host = args.metrics_host.unwrap_or_else(|| config.metrics_host.clone());
    let metrics_port = args.metrics_port.unwrap_or(config.metrics_port);
    let local_root = args.local_root.unwrap_or_else(|| config.local_root.clone());

    let metrics = metrics::start(&metrics_host, metrics_port).await;
    if let Some(addr) = metrics.endpoint {
        println!("Metrics available at http://{}/metrics", addr);
    }

    let remote = if args.dry_run {
        remote::RemoteTarget::unavailable("dry run")
    } else {
        remote::connect(&config).await
    };

    let job = BackupJob::new(args.target)
        .dry_run(args.dry_run)
        .local_root(local_root);
    let report = job.run(remote, metrics.sink.as_ref()).await;
    println!("{}", report);

    Ok(ExitCode::from(report.exit_code()))
}
