use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yoloprep operations.
///
/// Everything here is fatal for the invocation. Per-item problems (a
/// skipped annotation, a missing label file) are not errors: they are
/// accumulated as counts in the component reports and the run succeeds.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("No image files found in {path}")]
    EmptyDataset { path: PathBuf },

    #[error("Invalid dataset layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to parse class file {path}: {message}")]
    ClassFileParse { path: PathBuf, message: String },
}
