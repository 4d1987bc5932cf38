//! Native surface support.
//!
//! On Windows the overlay is a layered tool window painted with per-pixel
//! alpha. Other targets only get a placeholder surface so the rest of the
//! app can still be exercised.

use clock_overlay::Rect;
use image::RgbaImage;
use winit::monitor::MonitorHandle;
use winit::window::Window;

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::{cursor_position, system_application_icon, DisplayWatch, Surface};

#[cfg(not(target_os = "windows"))]
mod fallback;
#[cfg(not(target_os = "windows"))]
pub use self::fallback::{cursor_position, system_application_icon, DisplayWatch, Surface};

pub fn monitor_rects(window: &Window) -> Vec<Rect> {
    window.available_monitors().map(|m| monitor_rect(&m)).collect()
}

pub fn monitor_rect(monitor: &MonitorHandle) -> Rect {
    let position = monitor.position();
    let size = monitor.size();
    Rect::new(position.x, position.y, size.width as i32, size.height as i32)
}

/// Last seen monitor layout, for targets without a display-change message.
#[cfg_attr(target_os = "windows", allow(dead_code))]
#[derive(Debug, Default)]
pub struct LayoutSnapshot {
    screens: Vec<Rect>,
}

#[cfg_attr(target_os = "windows", allow(dead_code))]
impl LayoutSnapshot {
    pub fn new(screens: Vec<Rect>) -> Self {
        Self { screens }
    }

    /// Record `screens`. Returns whether they differ from the previous layout.
    pub fn update(&mut self, screens: Vec<Rect>) -> bool {
        if screens == self.screens {
            return false;
        }
        log::debug!("Screen layout changed: {:?}", screens);
        self.screens = screens;
        true
    }
}

/// Convert straight RGBA into the premultiplied BGRA layout layered windows expect.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub fn premultiplied_bgra(frame: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.as_raw().len());
    for pixel in frame.pixels() {
        let [r, g, b, a] = pixel.0;
        out.extend_from_slice(&[
            premultiply(b, a),
            premultiply(g, a),
            premultiply(r, a),
            a,
        ]);
    }
    out
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    ((u16::from(channel) * u16::from(alpha) + 127) / 255) as u8
}

/// Build an RGBA image from 32-bit BGRA icon bits.
///
/// Legacy icons leave the alpha channel empty and carry transparency in a
/// separate AND mask, where a black mask pixel is opaque. `mask` is read only
/// when every color pixel has zero alpha.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub fn icon_rgba(
    width: u32,
    height: u32,
    color: &[u8],
    mask: Option<&[u8]>,
) -> Option<RgbaImage> {
    let len = width as usize * height as usize * 4;
    if width == 0 || height == 0 || color.len() < len {
        return None;
    }
    let color = &color[..len];
    let has_alpha = color.chunks_exact(4).any(|px| px[3] != 0);

    let mut rgba = Vec::with_capacity(len);
    for (i, px) in color.chunks_exact(4).enumerate() {
        let alpha = if has_alpha {
            px[3]
        } else {
            match mask {
                Some(mask) if mask.len() >= len => {
                    let m = &mask[i * 4..i * 4 + 3];
                    if m.iter().all(|&v| v == 0) {
                        0xFF
                    } else {
                        0
                    }
                }
                _ => 0xFF,
            }
        };
        rgba.extend_from_slice(&[px[2], px[1], px[0], alpha]);
    }
    RgbaImage::from_raw(width, height, rgba)
}
