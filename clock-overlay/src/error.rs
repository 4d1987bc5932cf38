use std::io;
use std::path::PathBuf;

/// Failure while writing the settings file.
///
/// Reads never produce this; an unreadable file loads as defaults.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to create settings directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace {path}: {source}")]
    Replace { path: PathBuf, source: io::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("icon source is empty")]
    Missing,

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to decode icon: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decoded icon has no pixels")]
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("invalid clock font: {0}")]
    Invalid(#[from] ab_glyph::InvalidFont),

    #[error("font size must be positive, got {0}")]
    Size(f32),
}
