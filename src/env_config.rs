//! Shared environment configuration for the relint binaries.
//!
//! Consolidates `RELINT_PORT` and `RELINT_DATA_PATH` reads.

use std::path::PathBuf;

/// Read `RELINT_PORT` (default 9100).
pub fn server_port() -> u16 {
    std::env::var("RELINT_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9100)
}

/// Read `RELINT_DATA_PATH` (default `data/progress.json`): where
/// cross-session progress is stored.
pub fn progress_path() -> PathBuf {
    std::env::var("RELINT_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/progress.json"))
}
