//! Tray icon image.
//!
//! The image is read from the first available [`IconSource`], decoded with
//! the first [`DecodeStrategy`] that accepts it, and redrawn onto a small
//! transparent canvas. Every failure moves on to the next source; when all
//! of them fail the caller falls back to the system icon.

use std::borrow::Cow;
use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::IconError;

/// Edge length of the notification-area canvas.
pub const TRAY_ICON_SIZE: u32 = 16;

/// Enlargement beyond a strict fit so the glyph reads bolder.
pub const TRAY_ICON_SCALE: f32 = 1.35;

pub const ICON_FILE_NAME: &str = "clock.ico";

pub static EMBEDDED_ICON: &[u8] = include_bytes!("../assets/clock.ico");

#[derive(Debug, Clone)]
pub enum IconSource {
    Embedded(&'static [u8]),
    File(PathBuf),
}

impl IconSource {
    /// Embedded icon first, then `clock.ico` next to the executable.
    pub fn defaults() -> Vec<IconSource> {
        let mut sources = vec![IconSource::Embedded(EMBEDDED_ICON)];
        match std::env::current_exe() {
            Ok(exe) => {
                if let Some(dir) = exe.parent() {
                    sources.push(IconSource::File(dir.join(ICON_FILE_NAME)));
                }
            }
            Err(err) => log::debug!("Executable path unavailable: {}", err),
        }
        sources
    }

    pub fn read(&self) -> Result<Cow<'static, [u8]>, IconError> {
        let bytes = match self {
            IconSource::Embedded(bytes) => Cow::Borrowed(*bytes),
            IconSource::File(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|source| IconError::Read {
                    path: path.clone(),
                    source,
                })?,
        };
        if bytes.is_empty() {
            return Err(IconError::Missing);
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// Windows `.ico` container.
    Icon,
    /// Any other supported image format, detected from its header.
    Bitmap,
}

/// Tried in order until one succeeds.
pub const DECODE_STRATEGIES: [DecodeStrategy; 2] = [DecodeStrategy::Icon, DecodeStrategy::Bitmap];

impl DecodeStrategy {
    pub fn decode(self, bytes: &[u8]) -> Result<DynamicImage, IconError> {
        let image = match self {
            DecodeStrategy::Icon => image::load_from_memory_with_format(bytes, ImageFormat::Ico)?,
            DecodeStrategy::Bitmap => image::load_from_memory(bytes)?,
        };
        if image.width() == 0 || image.height() == 0 {
            return Err(IconError::Empty);
        }
        Ok(image)
    }
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, IconError> {
    let mut last_error = IconError::Missing;
    for strategy in DECODE_STRATEGIES {
        match strategy.decode(bytes) {
            Ok(image) => return Ok(image),
            Err(err) => {
                log::debug!("{:?} decode failed: {}", strategy, err);
                last_error = err;
            }
        }
    }
    Err(last_error)
}

/// Draw `source` centered on a transparent square canvas, scaled to fit and
/// then enlarged by [`TRAY_ICON_SCALE`]. Whatever overflows the canvas is
/// cropped.
pub fn fit_to_canvas(source: &RgbaImage) -> RgbaImage {
    let canvas_size = TRAY_ICON_SIZE as f32;
    let (width, height) = source.dimensions();
    let scale = fit_scale(width, height);

    let draw_width = ((width as f32 * scale).round() as u32).max(1);
    let draw_height = ((height as f32 * scale).round() as u32).max(1);
    let draw_x = ((canvas_size - draw_width as f32) / 2.0).round() as i64;
    let draw_y = ((canvas_size - draw_height as f32) / 2.0).round() as i64;

    let scaled = imageops::resize(source, draw_width, draw_height, FilterType::CatmullRom);
    let mut canvas = RgbaImage::new(TRAY_ICON_SIZE, TRAY_ICON_SIZE);
    imageops::overlay(&mut canvas, &scaled, draw_x, draw_y);
    canvas
}

pub fn fit_scale(width: u32, height: u32) -> f32 {
    let canvas_size = TRAY_ICON_SIZE as f32;
    (canvas_size / width as f32).min(canvas_size / height as f32) * TRAY_ICON_SCALE
}

/// Tray image from the first source that reads and decodes, or `None`.
pub fn load_tray_image(sources: &[IconSource]) -> Option<RgbaImage> {
    for source in sources {
        match source.read().and_then(|bytes| decode(&bytes)) {
            Ok(image) => {
                log::debug!("Tray icon loaded from {:?}", describe(source));
                return Some(fit_to_canvas(&image.to_rgba8()));
            }
            Err(err) => log::warn!("Tray icon source {:?} unusable: {}", describe(source), err),
        }
    }
    None
}

fn describe(source: &IconSource) -> Cow<'_, str> {
    match source {
        IconSource::Embedded(_) => Cow::Borrowed("embedded"),
        IconSource::File(path) => path.to_string_lossy(),
    }
}
