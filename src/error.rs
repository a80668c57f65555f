use std::path::PathBuf;

use thiserror::Error;

/// Errors from the I/O-bearing edges of the crate
///
/// Navigation itself never fails: it logs and leaves focus where it was.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid layout: {0}")]
    Layout(#[from] toml::de::Error),

    #[error("Invalid preferences file: {0}")]
    Preferences(toml::de::Error),

    #[error("Failed to encode preferences: {0}")]
    PreferencesEncode(#[from] toml::ser::Error),

    #[error("No data directory available for preferences")]
    NoPreferencesPath,
}

/// Result type for fallible crate operations
pub type NavResult<T> = Result<T, NavError>;
