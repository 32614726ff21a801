//! The three job entry points: backup, restore and verify.
//!
//! Each job runs to completion on the calling task and returns a report.
//! Reports render the user-facing diagnostics through `Display` and map to
//! process exit codes.

pub mod backup;
pub mod restore;
pub mod verify;

pub use backup::{BackupJob, BackupReport, RemoteAttempt};
pub use restore::{restore, RestoreReport};
pub use verify::{verify, InvalidManifest, InvalidReason, VerifyReport};

/// Job finished successfully.
pub const EXIT_SUCCESS: u8 = 0;
/// Verification found at least one invalid manifest.
pub const EXIT_INVALID: u8 = 1;
/// Backup failed or the manifest to restore could not be used.
pub const EXIT_FAILURE: u8 = 2;
