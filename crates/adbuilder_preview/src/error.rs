// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error type for the preview binary.

use adbuilder_timeline::TimelineError;
use std::path::PathBuf;

/// Anything that can stop a preview run
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Reading or writing a file failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Document JSON could not be parsed
    #[error("Invalid document {path}: {source}")]
    Document {
        /// Document file
        path: PathBuf,
        /// Parse error
        source: serde_json::Error,
    },

    /// Settings RON could not be parsed
    #[error("Invalid settings {path}: {source}")]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Parse error
        source: ron::error::SpannedError,
    },

    /// Settings could not be serialized
    #[error("Settings serialization error: {0}")]
    SettingsSerialize(#[from] ron::Error),

    /// Engine error
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

impl PreviewError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for the preview binary
pub type Result<T> = std::result::Result<T, PreviewError>;
