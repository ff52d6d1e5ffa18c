//! Error types for the fallible boundaries (map images, settings files)
//!
//! The per-tick core never fails; these only surface at load time.

use std::path::PathBuf;

/// Errors raised while reading a map image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    /// The image could not be opened or decoded.
    #[error("failed to load map image {path}: {source}")]
    Image {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image decoded but has no pixels.
    #[error("map image {0} is empty")]
    EmptyImage(PathBuf),
}

/// Errors raised while reading or writing a settings file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// Reading or writing the file failed.
    #[error("settings i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid settings JSON.
    #[error("invalid settings json: {0}")]
    Parse(#[from] serde_json::Error),
}
