use std::error::Error;
use std::io;

use clock_overlay::Point;
use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::LayoutSnapshot;

/// Sizes the window to each frame but does not paint it.
pub struct Surface;

impl Surface {
    pub fn attach(_window: &Window) -> Result<Self, Box<dyn Error>> {
        log::warn!("Layered overlay rendering is only supported on Windows");
        Ok(Self)
    }

    pub fn restyle(&self, _window: &Window) {}

    pub fn set_click_through(&mut self, window: &Window, enabled: bool) {
        if let Err(err) = window.set_cursor_hittest(!enabled) {
            log::debug!("Cursor hit-test toggle unsupported: {}", err);
        }
    }

    pub fn present(&mut self, window: &Window, frame: &RgbaImage) -> io::Result<()> {
        let (width, height) = frame.dimensions();
        let _ = window.request_inner_size(PhysicalSize::new(width, height));
        Ok(())
    }
}

pub fn system_application_icon() -> Option<RgbaImage> {
    None
}

/// Compares the monitor layout each time it is asked.
pub struct DisplayWatch {
    layout: LayoutSnapshot,
}

impl DisplayWatch {
    pub fn attach(window: &Window) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            layout: LayoutSnapshot::new(super::monitor_rects(window)),
        })
    }

    pub fn take_changed(&mut self, window: &Window) -> bool {
        self.layout.update(super::monitor_rects(window))
    }
}

pub fn cursor_position() -> Option<Point> {
    None
}
