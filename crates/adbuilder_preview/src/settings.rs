// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview settings, stored as RON.

use crate::error::{PreviewError, Result};
use adbuilder_timeline::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings file name, looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "preview.ron";

/// Settings for a preview run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Driver configuration (tick rate, durations)
    pub playback: PlaybackConfig,
    /// Upper bound on simulated ticks
    pub max_ticks: u32,
    /// Log the sampled frame every N ticks (0 disables)
    pub log_every: u32,
    /// Intermediate stops per keyframe gap in exported tables
    pub samples_per_segment: usize,
    /// Where stylesheets are written
    pub output_dir: PathBuf,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            max_ticks: 30 * 60,
            log_every: 15,
            samples_per_segment: 10,
            output_dir: PathBuf::from("preview_out"),
        }
    }
}

impl PreviewSettings {
    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PreviewError::io(path, e))?;
        ron::from_str(&content).map_err(|source| PreviewError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings as pretty RON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content).map_err(|e| PreviewError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("adbuilder_preview_missing_settings.ron");
        let _ = std::fs::remove_file(&path);
        assert_eq!(PreviewSettings::load_or_default(&path).unwrap(), PreviewSettings::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: PreviewSettings = ron::from_str("(max_ticks: 90, playback: (tick_rate_hz: 60.0))").unwrap();
        assert_eq!(settings.max_ticks, 90);
        assert_eq!(settings.playback.tick_rate_hz, 60.0);
        assert_eq!(settings.samples_per_segment, 10);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("adbuilder_preview_settings_{}.ron", std::process::id()));
        let settings = PreviewSettings {
            log_every: 0,
            ..PreviewSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(PreviewSettings::load(&path).unwrap(), settings);
        let _ = std::fs::remove_file(&path);
    }
}
