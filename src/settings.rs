//! Persisted user preferences.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::{self, Container};

const APP_DIR: &str = "media-downloader";
const FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// `None` until the user picks one; the system locale decides meanwhile.
    pub language: Option<String>,
    pub download_dir: PathBuf,
    pub format: Container,
    pub quality: String,
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    /// Visit every playlist item during analysis instead of the flat listing. Slower,
    /// and one unavailable item fails the whole playlist, but durations are complete.
    pub disable_flat_playlist: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        let format = Container::default();
        Self {
            language: None,
            download_dir: default_download_dir(),
            format,
            quality: formats::quality_options(format).default.to_string(),
            ytdlp_path: None,
            ffmpeg_path: None,
            disable_flat_playlist: false,
        }
    }
}

pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppSettings {
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("no config directory on this platform".into()))?;
        Ok(dir.join(APP_DIR).join(FILE_NAME))
    }

    /// Loads the settings file, falling back to defaults when it is missing or broken.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!("{}. Using default settings", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {:?}, using defaults", path);
            return Self::default();
        }
        let loaded = std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|content| serde_json::from_str::<Self>(&content).map_err(Error::from));

        match loaded {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings.sanitized()
            }
            Err(e) => {
                warn!("Failed to load settings from {:?}: {}. Using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Replaces values the UI could not have produced, e.g. a quality the current
    /// container does not offer.
    pub fn sanitized(mut self) -> Self {
        self.quality = formats::pick_quality(self.format, Some(&self.quality)).to_string();
        if self.download_dir.as_os_str().is_empty() {
            self.download_dir = default_download_dir();
        }
        self
    }

    /// Creates the download folder if it is the default one and does not exist yet.
    pub fn ensure_download_dir(&self) -> Result<()> {
        if !self.download_dir.exists() && self.download_dir == default_download_dir() {
            std::fs::create_dir_all(&self.download_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = AppSettings::default();
        assert_eq!(s.format, Container::Mp4);
        assert_eq!(s.quality, "1080p");
        assert!(s.language.is_none());
        assert!(!s.disable_flat_playlist);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let settings = AppSettings {
            language: Some("ja".into()),
            download_dir: dir.path().to_path_buf(),
            format: Container::Mp3,
            quality: "192 kbps".into(),
            ytdlp_path: Some(PathBuf::from("/opt/yt-dlp")),
            ffmpeg_path: None,
            disable_flat_playlist: true,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_and_corrupt_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults_and_fixes_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, r#"{"format": "FLAC", "quality": "1080p"}"#).unwrap();

        let loaded = AppSettings::load_from(&path);
        assert_eq!(loaded.format, Container::Flac);
        assert_eq!(loaded.quality, "Lossless (FLAC)");
        assert_eq!(loaded.download_dir, default_download_dir());
    }
}
