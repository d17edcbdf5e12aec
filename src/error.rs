//! Error types for maintsched.
//!
//! Every core operation hands one of these back to the caller; nothing in the
//! library prints or aborts on failure.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// An export or save was requested while the session holds no schedule.
    #[error("No schedule to operate on. Generate or load a schedule first.")]
    NoActiveSchedule,

    /// A saved schedule id that is not in the repository.
    #[error("Schedule {0} not found")]
    NotFound(u64),

    /// The store could not be read or written.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The document export could not produce output.
    #[error("Render failure: {0}")]
    Render(#[from] RenderError),

    /// An export file could not be written.
    #[error("Failed to write export to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured export could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected by the input-collection layer.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised at the store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored data exists but does not have the expected shape.
    #[error("Corrupt data under '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("Quota exceeded writing '{key}': {size} bytes (limit {limit})")]
    QuotaExceeded { key: String, size: usize, limit: usize },
}

/// Errors raised by document renderers.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("Renderer failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
