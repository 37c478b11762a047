//! Progress persistence: JSON on disk, defaults on any read failure.
//!
//! A missing file is the normal first-run case and loads silently; a
//! malformed file is logged and replaced with defaults — corruption is never
//! surfaced to the caller as a failure. Saves are atomic: write to a
//! temporary sibling, then rename over the target.

use std::fs;
use std::io;
use std::path::Path;

use crate::progress::ProgressData;

/// Load progress, substituting defaults for anything unreadable.
pub fn load_progress(path: &Path) -> ProgressData {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return ProgressData::default(),
        Err(e) => {
            log::warn!("could not read {}: {} — using defaults", path.display(), e);
            return ProgressData::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(e) => {
            log::warn!(
                "malformed progress data in {}: {} — using defaults",
                path.display(),
                e
            );
            ProgressData::default()
        }
    }
}

/// Save progress atomically (temp file + rename). Creates parent
/// directories as needed.
pub fn save_progress(path: &Path, data: &ProgressData) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)
}
