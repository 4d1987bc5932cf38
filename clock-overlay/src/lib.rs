//! Core of the desktop clock overlay: persisted preferences, the color
//! palette, placement and drag rules, the clock face and the tray icon image.
//!
//! Nothing in this crate touches a window system; the desktop binary wires
//! these pieces to winit and the Win32 shell.

pub mod clock;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod icon;
pub mod palette;
pub mod placement;
pub mod render;
pub mod settings;

pub use error::{FontError, IconError, SettingsError};
pub use geometry::{Point, Rect, Size};
pub use palette::Argb;
pub use settings::{OverlaySettings, SettingsStore};
