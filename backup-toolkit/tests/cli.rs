//! End-to-end checks against the compiled binaries.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(bin: &str, args: &[&str], cwd: &Path, envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(bin);
    command
        .args(args)
        .current_dir(cwd)
        .env_remove("BACKUP_BUCKET")
        .env_remove("LOCAL_BACKUP_ROOT")
        .env_remove("RUST_LOG")
        .env("METRICS_LISTEN_ADDR", "127.0.0.1")
        .env("METRICS_LISTEN_PORT", "0");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("failed to spawn binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn manifest_names(dir: &Path, prefix: &str) -> Vec<String> {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| name.starts_with(prefix) && name.ends_with(".manifest.json"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_dry_run_creates_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_string_lossy().to_string();

    let output = run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "test-target", "--dry-run"],
        temp_dir.path(),
        &[("LOCAL_BACKUP_ROOT", root.as_str())],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert_eq!(manifest_names(&temp_dir.path().join("manifests"), "test-target-").len(), 1);
    assert!(stdout(&output).contains("[dry-run] Manifest written to"));
}

#[test]
fn test_metrics_address_is_the_bound_one() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "test-target", "--dry-run"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    let line = out
        .lines()
        .find(|line| line.starts_with("Metrics available at http://127.0.0.1:"))
        .expect("metrics address should be printed");
    assert!(!line.ends_with(":0/metrics"), "{line}");
}

#[test]
fn test_default_local_root_is_relative() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "test-target", "--dry-run"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    let dir = temp_dir.path().join("backups/manifests");
    assert_eq!(manifest_names(&dir, "test-target-").len(), 1);
}

#[test]
fn test_backup_without_bucket_writes_local() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "web", "--local-root", "store"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(manifest_names(&temp_dir.path().join("store/manifests"), "web-").len(), 1);
    assert!(stdout(&output).contains("Manifest written to"));
}

#[test]
fn test_backup_failure_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join("store")).unwrap();
    fs::write(temp_dir.path().join("store/manifests"), b"blocker").unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "web", "--dry-run", "--local-root", "store"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Backup failed"));
}

#[test]
fn test_restore_missing_manifest() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_run-restore"),
        &["--manifest", "nope.manifest.json", "--destination", "/srv"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Manifest not found"));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_restore_after_backup() {
    let temp_dir = TempDir::new().unwrap();
    run(
        env!("CARGO_BIN_EXE_run-backup"),
        &["--target", "db", "--dry-run", "--local-root", "."],
        temp_dir.path(),
        &[],
    );
    let name = manifest_names(&temp_dir.path().join("manifests"), "db-")
        .pop()
        .expect("backup should have written a manifest");
    let manifest = temp_dir.path().join("manifests").join(name);

    let output = run(
        env!("CARGO_BIN_EXE_run-restore"),
        &["--manifest", &manifest.to_string_lossy(), "--destination", "/srv/db"],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Restoring target: db"));
    assert!(out.contains("Simulated restore to /srv/db complete."));
}

#[test]
fn test_verify_reports_one_invalid_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("manifests");
    fs::create_dir(&dir).unwrap();
    fs::write(
        dir.join("good-1.manifest.json"),
        br#"{"target": "good", "timestamp": 1, "status": "SUCCESS"}"#,
    )
    .unwrap();
    fs::write(dir.join("bad-2.manifest.json"), b"{}").unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_verify-backup"),
        &["--manifests-dir", &dir.to_string_lossy()],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert_eq!(out.matches("Invalid manifest").count(), 1);
    assert!(out.contains("bad-2.manifest.json"));
}

#[test]
fn test_verify_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(
        env!("CARGO_BIN_EXE_verify-backup"),
        &[],
        temp_dir.path(),
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(temp_dir.path().join("backups/manifests").is_dir());
    assert!(stdout(&output).contains("All manifests look valid."));
}
