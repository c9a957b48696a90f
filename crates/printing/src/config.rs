use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::Color;
use crate::imposition::DEFAULT_TILE_SPACING_PT;

const MIN_DPI: f32 = 24.0;
const MAX_DPI: f32 = 1200.0;

#[derive(Debug, Error)]
pub enum PreviewSettingsError {
    #[error("failed to read preview settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preview settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preview settings {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preview settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Knobs of the preview pipeline, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSettings {
    #[serde(default = "default_target_dpi")]
    pub target_dpi: f32,
    #[serde(default = "default_true")]
    pub include_vector_document: bool,
    #[serde(default = "default_tile_spacing")]
    pub tile_spacing_pt: f32,
    /// RGB background of preview bitmaps.
    #[serde(default = "default_background")]
    pub raster_background: [u8; 3],
    #[serde(default = "default_true")]
    pub show_margin_guides: bool,
}

fn default_target_dpi() -> f32 {
    96.0
}

fn default_true() -> bool {
    true
}

fn default_tile_spacing() -> f32 {
    DEFAULT_TILE_SPACING_PT
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            target_dpi: default_target_dpi(),
            include_vector_document: true,
            tile_spacing_pt: default_tile_spacing(),
            raster_background: default_background(),
            show_margin_guides: true,
        }
    }
}

impl PreviewSettings {
    pub fn sanitize(&mut self) {
        if !self.target_dpi.is_finite() || self.target_dpi <= 0.0 {
            self.target_dpi = default_target_dpi();
        }
        self.target_dpi = self.target_dpi.clamp(MIN_DPI, MAX_DPI);
        if !self.tile_spacing_pt.is_finite() || self.tile_spacing_pt < 0.0 {
            self.tile_spacing_pt = default_tile_spacing();
        }
    }

    pub fn background_color(&self) -> Color {
        let [r, g, b] = self.raster_background;
        Color::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            1.0,
        )
    }

    /// Reads settings from `path`, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreviewSettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| PreviewSettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: PreviewSettings =
            serde_json::from_str(&contents).map_err(|source| PreviewSettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PreviewSettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreviewSettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(self).map_err(|source| {
            PreviewSettingsError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| PreviewSettingsError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| PreviewSettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_restores_invalid_values() {
        let mut settings = PreviewSettings {
            target_dpi: -3.0,
            tile_spacing_pt: f32::NAN,
            ..PreviewSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.target_dpi, 96.0);
        assert_eq!(settings.tile_spacing_pt, DEFAULT_TILE_SPACING_PT);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: PreviewSettings = serde_json::from_str(r#"{ "target_dpi": 150 }"#).unwrap();
        assert_eq!(settings.target_dpi, 150.0);
        assert!(settings.include_vector_document);
        assert_eq!(settings.raster_background, [255, 255, 255]);
    }
}
