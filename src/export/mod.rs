//! Export adapters for the active schedule.
//!
//! `json` is a lossless structured export; `document` lays the schedule out on
//! fixed-size pages and hands the layout to a [`document::DocumentRenderer`]
//! such as [`pdf::PdfRenderer`].

pub mod document;
pub mod json;
pub mod pdf;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SchedulerError};

/// `<machine>-maintenance-schedule.<ext>`, with path separators in the machine
/// name replaced so the result is a single path component.
pub fn export_file_name(machine_name: &str, extension: &str) -> String {
    let safe: String = machine_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{}-maintenance-schedule.{}", safe, extension)
}

/// Writes `bytes` to `dir/file_name`, creating `dir` if needed.
pub(crate) fn write_export(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let mut path = dir.to_path_buf();
    path.push(file_name);
    let export_err = |source| SchedulerError::Export {
        path: path.clone(),
        source,
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(export_err)?;
    }
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .map_err(export_err)?;
    f.write_all(bytes).map_err(export_err)?;
    info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(path)
}
