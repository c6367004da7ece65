use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogOrder;
use crate::export::SHARE_QUALITY;
use crate::thumbnail::THUMBNAIL_COEFFICIENT;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the `<Country>@3x.png` flags and `strings/`.
    pub resource_dir: Option<PathBuf>,
    pub locale: Option<String>,
    pub order: CatalogOrder,
    pub thumbnail_coefficient: f32,
    pub share_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resource_dir: None,
            locale: None,
            order: CatalogOrder::default(),
            thumbnail_coefficient: THUMBNAIL_COEFFICIENT,
            share_quality: SHARE_QUALITY,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let mut settings: Settings = serde_json::from_str(&data)?;
        let c = settings.thumbnail_coefficient;
        if !(c > 0.0 && c <= 1.0) {
            log::warn!(
                "thumbnail_coefficient {} out of range, using {}",
                settings.thumbnail_coefficient,
                THUMBNAIL_COEFFICIENT
            );
            settings.thumbnail_coefficient = THUMBNAIL_COEFFICIENT;
        }
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Load from the user's config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Best-effort save to the user's config directory.
    pub fn save(&self) {
        if let Some(path) = settings_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings: {}", e);
            }
        }
    }

    pub fn resource_dir(&self) -> PathBuf {
        self.resource_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("resources"))
    }

    /// Configured locale, else the environment's, else English.
    pub fn locale(&self) -> String {
        self.locale
            .clone()
            .or_else(|| {
                ["LC_ALL", "LC_MESSAGES", "LANG"]
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|v| !v.is_empty())
            })
            .unwrap_or_else(|| "en".to_string())
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs_next::home_dir().map(|d| d.join(".world-flags"))
}

fn settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(SETTINGS_FILE))
}
