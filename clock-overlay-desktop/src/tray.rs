//! Notification-area icon and its context menu.

use image::RgbaImage;

pub const TRAY_TOOLTIP: &str = "Windows Clock Overlay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    ResetPosition,
    /// Index into the palette.
    SelectColor(usize),
    Exit,
}

#[cfg(target_os = "windows")]
pub use self::native::Tray;

#[cfg(not(target_os = "windows"))]
pub use self::unsupported::Tray;

/// Tray image from the bundled sources, or the system icon when none decode.
pub fn tray_image() -> Option<RgbaImage> {
    use clock_overlay::icon::{self, IconSource};

    icon::load_tray_image(&IconSource::defaults()).or_else(|| {
        log::warn!("Falling back to the system application icon");
        crate::platform::system_application_icon()
    })
}

#[cfg(target_os = "windows")]
mod native {
    use std::error::Error;

    use clock_overlay::palette::PALETTE;
    use image::RgbaImage;
    use muda::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem, Submenu};
    use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

    use super::{TrayCommand, TRAY_TOOLTIP};
    use crate::controller::ColorMenu;

    pub struct Tray {
        icon: TrayIcon,
        reset_id: MenuId,
        exit_id: MenuId,
        colors: Vec<CheckMenuItem>,
    }

    impl Tray {
        pub fn new(image: Option<RgbaImage>) -> Result<Self, Box<dyn Error>> {
            let reset = MenuItem::new("Reset Position", true, None);
            let exit = MenuItem::new("Exit", true, None);

            let color_menu = Submenu::new("Clock Color", true);
            let colors: Vec<CheckMenuItem> = PALETTE
                .iter()
                .map(|entry| CheckMenuItem::new(entry.menu_label(), true, false, None))
                .collect();
            for item in &colors {
                color_menu.append(item)?;
            }

            let menu = Menu::new();
            menu.append(&reset)?;
            menu.append(&PredefinedMenuItem::separator())?;
            menu.append(&color_menu)?;
            menu.append(&PredefinedMenuItem::separator())?;
            menu.append(&exit)?;

            let mut builder = TrayIconBuilder::new()
                .with_menu(Box::new(menu))
                .with_tooltip(TRAY_TOOLTIP);
            if let Some(image) = image {
                let (width, height) = image.dimensions();
                builder = builder.with_icon(Icon::from_rgba(image.into_raw(), width, height)?);
            }
            let icon = builder.build()?;
            log::info!("Tray icon created");

            Ok(Self {
                icon,
                reset_id: reset.id().clone(),
                exit_id: exit.id().clone(),
                colors,
            })
        }

        /// Drain pending menu selections.
        pub fn poll(&self) -> Vec<TrayCommand> {
            let mut commands = Vec::new();
            while let Ok(event) = MenuEvent::receiver().try_recv() {
                match self.command_for(&event.id) {
                    Some(command) => commands.push(command),
                    None => log::debug!("Ignoring menu event {:?}", event.id),
                }
            }
            commands
        }

        pub fn hide(&self) {
            if let Err(err) = self.icon.set_visible(false) {
                log::warn!("Hiding tray icon failed: {}", err);
            }
        }

        fn command_for(&self, id: &MenuId) -> Option<TrayCommand> {
            if *id == self.reset_id {
                return Some(TrayCommand::ResetPosition);
            }
            if *id == self.exit_id {
                return Some(TrayCommand::Exit);
            }
            self.colors
                .iter()
                .position(|item| item.id() == id)
                .map(TrayCommand::SelectColor)
        }
    }

    impl ColorMenu for Tray {
        fn set_checked_color(&mut self, index: usize) {
            for (i, item) in self.colors.iter().enumerate() {
                item.set_checked(i == index);
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod unsupported {
    use std::error::Error;

    use image::RgbaImage;

    use super::TrayCommand;
    use crate::controller::ColorMenu;

    pub struct Tray;

    impl Tray {
        pub fn new(_image: Option<RgbaImage>) -> Result<Self, Box<dyn Error>> {
            log::warn!("Tray icon is only supported on Windows");
            Ok(Self)
        }

        pub fn poll(&self) -> Vec<TrayCommand> {
            Vec::new()
        }

        pub fn hide(&self) {}
    }

    impl ColorMenu for Tray {
        fn set_checked_color(&mut self, index: usize) {
            log::debug!("Clock color {} selected", index);
        }
    }
}
