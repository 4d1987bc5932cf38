use std::error::Error;

use clock_overlay::{Point, Rect, Size};
use image::RgbaImage;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Window, WindowBuilder, WindowId, WindowLevel};

#[cfg(target_os = "windows")]
use winit::platform::windows::WindowBuilderExtWindows;

use crate::controller::OverlayWindow;
use crate::platform::{self, DisplayWatch, Surface};

pub const WINDOW_TITLE: &str = "Clock Overlay";

/// Borderless, always-on-top overlay window backed by winit.
pub struct WinitOverlay {
    // Dropped before the window it is attached to.
    display_watch: DisplayWatch,
    window: Window,
    surface: Surface,
    location: Point,
    size: Size,
}

impl WinitOverlay {
    pub fn build<T>(elwt: &EventLoopWindowTarget<T>) -> Result<Self, Box<dyn Error>> {
        let builder = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(1, 1))
            .with_visible(false);

        #[cfg(target_os = "windows")]
        let builder = builder.with_skip_taskbar(true);

        let window = builder.build(elwt)?;
        let surface = Surface::attach(&window)?;
        let display_watch = DisplayWatch::attach(&window)?;
        let location = window
            .outer_position()
            .map(|p| Point::new(p.x, p.y))
            .unwrap_or_default();

        Ok(Self {
            display_watch,
            window,
            surface,
            location,
            size: Size::new(1, 1),
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    /// Whether the display configuration changed since the last call.
    pub fn take_display_change(&mut self) -> bool {
        self.display_watch.take_changed(&self.window)
    }

    /// Screen position of the cursor.
    ///
    /// Uses the system cursor when available, otherwise the last client-area
    /// position reported by the window.
    pub fn screen_cursor(&self, client: Option<PhysicalPosition<f64>>) -> Option<Point> {
        resolve_cursor(platform::cursor_position(), self.location(), client)
    }

    /// Hide the window and stop listening for display changes.
    pub fn close(self) {
        self.window.set_visible(false);
    }
}

fn resolve_cursor(
    absolute: Option<Point>,
    origin: Point,
    client: Option<PhysicalPosition<f64>>,
) -> Option<Point> {
    absolute.or_else(|| client.map(|c| origin.offset(c.x.round() as i32, c.y.round() as i32)))
}

impl OverlayWindow for WinitOverlay {
    fn location(&self) -> Point {
        match self.window.outer_position() {
            Ok(position) => Point::new(position.x, position.y),
            Err(_) => self.location,
        }
    }

    fn set_location(&mut self, location: Point) {
        if location != self.location() {
            self.window
                .set_outer_position(PhysicalPosition::new(location.x, location.y));
        }
        self.location = location;
    }

    fn size(&self) -> Size {
        self.size
    }

    fn present(&mut self, frame: &RgbaImage) {
        if let Err(err) = self.surface.present(&self.window, frame) {
            log::warn!("Presenting clock frame failed: {}", err);
            return;
        }
        self.size = Size::new(frame.width() as i32, frame.height() as i32);
    }

    fn show(&mut self) {
        self.window.set_visible(true);
        self.surface.restyle(&self.window);
    }

    fn screens(&self) -> Vec<Rect> {
        platform::monitor_rects(&self.window)
    }

    fn primary_screen(&self) -> Option<Rect> {
        self.window.primary_monitor().map(|m| platform::monitor_rect(&m))
    }

    fn set_click_through(&mut self, enabled: bool) {
        self.surface.set_click_through(&self.window, enabled);
    }
}
