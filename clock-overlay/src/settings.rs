use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::geometry::Point;
use crate::palette::{self, Argb};

pub const SETTINGS_DIR_NAME: &str = "WindowsClockOverlay";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Persistent user preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OverlaySettings {
    position_x: Option<i32>,
    position_y: Option<i32>,
    foreground_color_argb: i32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            position_x: None,
            position_y: None,
            foreground_color_argb: palette::DEFAULT_FOREGROUND.into(),
        }
    }
}

impl OverlaySettings {
    pub fn new(position: Option<Point>, foreground: Argb) -> Self {
        let mut settings = Self::default();
        settings.set_position(position);
        settings.set_foreground(foreground);
        settings
    }

    /// Saved manual position. Only reported when both coordinates are present.
    pub fn position(&self) -> Option<Point> {
        match (self.position_x, self.position_y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    pub fn set_position(&mut self, position: Option<Point>) {
        self.position_x = position.map(|p| p.x);
        self.position_y = position.map(|p| p.y);
    }

    pub fn foreground(&self) -> Argb {
        Argb::from(self.foreground_color_argb)
    }

    pub fn set_foreground(&mut self, color: Argb) {
        self.foreground_color_argb = color.into();
    }

    // A file with only one coordinate is treated as having none.
    fn normalized(mut self) -> Self {
        let position = self.position();
        self.set_position(position);
        self
    }
}

/// Reads and writes [`OverlaySettings`] as indented JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Store at the per-user location, `<local data dir>/WindowsClockOverlay/settings.json`.
    pub fn new() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| {
            log::warn!("No per-user data directory available, using a relative settings path");
            PathBuf::new()
        });
        Self::at(base.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file that receives the new contents before it replaces `path`.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Load settings, falling back to defaults when the file is missing,
    /// unreadable or malformed.
    pub fn load(&self) -> OverlaySettings {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", self.path.display());
                return OverlaySettings::default();
            }
            Err(err) => {
                log::warn!("Failed to read {}: {}", self.path.display(), err);
                return OverlaySettings::default();
            }
        };

        match serde_json::from_str::<OverlaySettings>(&contents) {
            Ok(settings) => {
                let settings = settings.normalized();
                log::info!("Loaded settings from {}: {:?}", self.path.display(), settings);
                settings
            }
            Err(err) => {
                log::warn!("Ignoring malformed settings {}: {}", self.path.display(), err);
                OverlaySettings::default()
            }
        }
    }

    /// Write settings through a temporary sibling and rename it over the target.
    pub fn save(&self, settings: &OverlaySettings) -> Result<(), SettingsError> {
        self.stage(settings)?.commit()?;
        log::info!("Saved settings to {}: {:?}", self.path.display(), settings);
        Ok(())
    }

    /// First half of [`save`](Self::save): the new contents are fully written
    /// to the temporary file but the target is untouched until `commit`.
    pub fn stage(&self, settings: &OverlaySettings) -> Result<StagedSettings, SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, json).map_err(|source| SettingsError::Write {
            path: temp_path.clone(),
            source,
        })?;

        Ok(StagedSettings {
            temp_path,
            target: self.path.clone(),
        })
    }
}

/// Settings written to the temporary file and waiting to replace the target.
///
/// Dropping it without calling [`commit`](Self::commit) leaves the previous
/// file in place.
#[derive(Debug)]
#[must_use = "staged settings are not visible until committed"]
pub struct StagedSettings {
    temp_path: PathBuf,
    target: PathBuf,
}

impl StagedSettings {
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn commit(self) -> Result<(), SettingsError> {
        std::fs::rename(&self.temp_path, &self.target).map_err(|source| SettingsError::Replace {
            path: self.target.clone(),
            source,
        })
    }
}
