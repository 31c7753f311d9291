//! Thumbnail configuration.
//!
//! Loaded from a JSON file named by `THUMBWAVE_CONFIG`; every field is
//! optional and falls back to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::thumbnail::render::DEFAULT_COLOR;
use crate::types::Color;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "THUMBWAVE_CONFIG";

const DEFAULT_RASTER_WIDTHS: [u32; 6] = [1024, 512, 256, 128, 64, 32];
const DEFAULT_RASTER_HEIGHT: u32 = 128;
const DEFAULT_RASTER_WIDTH_LIMIT: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Widths of the prerendered full-range rasters.
    pub raster_widths: Vec<u32>,
    /// Height shared by every prerendered raster.
    pub raster_height: u32,
    /// Requests wider than this always go through the window renderer.
    pub raster_width_limit: u32,
    /// Waveform color baked into the prerendered rasters.
    pub raster_color: Color,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            raster_widths: DEFAULT_RASTER_WIDTHS.to_vec(),
            raster_height: DEFAULT_RASTER_HEIGHT,
            raster_width_limit: DEFAULT_RASTER_WIDTH_LIMIT,
            raster_color: DEFAULT_COLOR,
        }
    }
}

/// Config file path from `THUMBWAVE_CONFIG`, if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

impl ThumbnailConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ThumbnailConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded thumbnail config from {}", path.display());
        Ok(config.normalized())
    }

    /// Load from `THUMBWAVE_CONFIG` when set, otherwise use defaults.
    pub fn load_or_default() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Raster widths sorted widest first, without zeros or duplicates.
    pub fn normalized(mut self) -> Self {
        self.raster_widths.retain(|&width| width > 0);
        self.raster_widths.sort_unstable_by(|a, b| b.cmp(a));
        self.raster_widths.dedup();

        if self.raster_height == 0 {
            log::warn!(
                "raster_height must be positive, using {}",
                DEFAULT_RASTER_HEIGHT
            );
            self.raster_height = DEFAULT_RASTER_HEIGHT;
        }
        if let Some(&widest) = self.raster_widths.first() {
            if widest > self.raster_width_limit {
                log::warn!(
                    "Raster width {} exceeds raster_width_limit {} and will never be used",
                    widest,
                    self.raster_width_limit
                );
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sorted() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.clone().normalized(), config);
        assert_eq!(config.raster_width_limit, 1024);
    }

    #[test]
    fn test_normalized_sorts_and_dedups() {
        let config = ThumbnailConfig {
            raster_widths: vec![64, 0, 256, 64, 128],
            raster_height: 0,
            ..ThumbnailConfig::default()
        }
        .normalized();
        assert_eq!(config.raster_widths, vec![256, 128, 64]);
        assert_eq!(config.raster_height, DEFAULT_RASTER_HEIGHT);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thumbwave.json");
        std::fs::write(
            &path,
            r#"{"raster_widths": [32, 300], "raster_color": {"r": 10, "g": 20, "b": 30}}"#,
        )
        .unwrap();

        let config = ThumbnailConfig::load(&path).unwrap();
        assert_eq!(config.raster_widths, vec![300, 32]);
        assert_eq!(config.raster_height, DEFAULT_RASTER_HEIGHT);
        assert_eq!(config.raster_color, Color::rgb(10, 20, 30));
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ThumbnailConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));

        let missing = ThumbnailConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(format!("{}", missing).contains("missing.json"));
    }
}
