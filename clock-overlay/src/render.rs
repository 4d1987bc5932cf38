//! Clock face rasterizer.
//!
//! The label is drawn with a bundled bold monospace font into a transparent
//! frame exactly as large as the text line plus padding; the window is sized
//! to the frame. Glyph edges are anti-aliased through the alpha channel.

use ab_glyph::{point, Font, FontRef, Glyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::FontError;
use crate::geometry::Size;
use crate::palette::Argb;

pub static CLOCK_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSansMono-Bold.ttf");

/// 22pt at 96 dpi.
pub const FONT_SIZE_PX: f32 = 22.0 * 96.0 / 72.0;

/// Transparent border around the text, in pixels.
pub const PADDING: u32 = 4;

struct Layout {
    glyphs: Vec<Glyph>,
    width: u32,
    height: u32,
}

#[derive(Clone)]
pub struct ClockFace {
    font: FontRef<'static>,
    scale: PxScale,
    padding: u32,
}

impl ClockFace {
    /// The bundled font at the default size.
    pub fn new() -> Result<Self, FontError> {
        Self::with_font(CLOCK_FONT, FONT_SIZE_PX, PADDING)
    }

    pub fn with_font(bytes: &'static [u8], size_px: f32, padding: u32) -> Result<Self, FontError> {
        if size_px.is_nan() || size_px <= 0.0 {
            return Err(FontError::Size(size_px));
        }
        let font = FontRef::try_from_slice(bytes)?;
        Ok(Self {
            font,
            scale: PxScale::from(size_px),
            padding,
        })
    }

    pub fn measure(&self, text: &str) -> Size {
        let layout = self.layout(text);
        Size::new(layout.width as i32, layout.height as i32)
    }

    /// Draw `text` in `color` on a transparent frame sized by [`measure`](Self::measure).
    ///
    /// Full glyph coverage is opaque; the color's alpha byte is ignored.
    pub fn render(&self, text: &str, color: Argb) -> RgbaImage {
        let layout = self.layout(text);
        let mut frame = RgbaImage::new(layout.width, layout.height);
        let (width, height) = (layout.width as i32, layout.height as i32);

        for glyph in layout.glyphs {
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = bounds.min.x as i32 + x as i32;
                let py = bounds.min.y as i32 + y as i32;
                if px < 0 || py < 0 || px >= width || py >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = frame.get_pixel_mut(px as u32, py as u32);
                if alpha > pixel[3] {
                    *pixel = Rgba([color.red(), color.green(), color.blue(), alpha]);
                }
            });
        }

        frame
    }

    fn layout(&self, text: &str) -> Layout {
        let font = self.font.as_scaled(self.scale);
        let left = self.padding as f32;
        let baseline = self.padding as f32 + font.ascent();

        let mut caret = left;
        let mut previous = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(previous) = previous {
                caret += font.kern(previous, id);
            }
            glyphs.push(id.with_scale_and_position(self.scale, point(caret, baseline)));
            caret += font.h_advance(id);
            previous = Some(id);
        }

        let line_height = font.ascent() - font.descent();
        Layout {
            glyphs,
            width: ((caret - left).ceil() as u32 + 2 * self.padding).max(1),
            height: (line_height.ceil() as u32 + 2 * self.padding).max(1),
        }
    }
}
