use clock_overlay::drag::DragGesture;
use clock_overlay::palette::{self, Argb};
use clock_overlay::placement::{self, PlacementMode, FALLBACK_SCREEN};
use clock_overlay::render::ClockFace;
use clock_overlay::{OverlaySettings, Point, Rect, SettingsError, SettingsStore, Size};
use image::RgbaImage;

/// The native overlay surface as seen by the controller.
pub trait OverlayWindow {
    /// Top-left corner in screen coordinates.
    fn location(&self) -> Point;
    fn set_location(&mut self, location: Point);
    fn size(&self) -> Size;
    /// Show `frame` and resize the window to match it.
    fn present(&mut self, frame: &RgbaImage);
    fn show(&mut self);
    fn screens(&self) -> Vec<Rect>;
    fn primary_screen(&self) -> Option<Rect>;
    fn set_click_through(&mut self, enabled: bool);
}

/// Check state of the tray's color submenu.
pub trait ColorMenu {
    fn set_checked_color(&mut self, index: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Other,
}

pub struct OverlayController<W, M> {
    window: W,
    menu: M,
    store: SettingsStore,
    face: ClockFace,
    foreground: Argb,
    mode: PlacementMode,
    saved_location: Point,
    drag: DragGesture,
    did_initial_placement: bool,
    click_through: bool,
    text: String,
}

impl<W: OverlayWindow, M: ColorMenu> OverlayController<W, M> {
    pub fn new(window: W, menu: M, store: SettingsStore, face: ClockFace) -> Self {
        let settings = store.load();
        let (mode, saved_location) = match settings.position() {
            Some(location) => (PlacementMode::Manual, location),
            None => (PlacementMode::Default, Point::default()),
        };
        log::info!("Starting in {:?} placement", mode);

        let mut controller = Self {
            window,
            menu,
            store,
            face,
            foreground: settings.foreground(),
            mode,
            saved_location,
            drag: DragGesture::default(),
            did_initial_placement: false,
            click_through: false,
            text: String::new(),
        };
        controller.apply_color(settings.foreground());
        controller.set_click_through(false);
        controller
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn menu(&self) -> &M {
        &self.menu
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    #[cfg(test)]
    pub fn foreground(&self) -> Argb {
        self.foreground
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    #[cfg(test)]
    pub fn is_click_through(&self) -> bool {
        self.click_through
    }

    /// Redraw the clock with `text` and keep the window placed.
    ///
    /// The first refresh performs the initial placement; later ones only
    /// re-pin the window while in default placement.
    pub fn refresh(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
        }
        self.redraw();

        if !self.did_initial_placement {
            match self.mode {
                PlacementMode::Default => self.apply_default_location(),
                PlacementMode::Manual => {
                    self.window.set_location(self.saved_location);
                    self.clamp_to_screen();
                }
            }
            self.did_initial_placement = true;
            self.window.show();
            log::info!("Initial placement at {:?}", self.window.location());
            return;
        }

        if self.mode == PlacementMode::Default {
            self.apply_default_location();
        }
    }

    pub fn press(&mut self, button: PointerButton, cursor: Point) {
        if button != PointerButton::Primary {
            return;
        }
        if self.mode != PlacementMode::Manual {
            log::info!("Switching to manual placement");
        }
        self.mode = PlacementMode::Manual;
        self.drag.begin(cursor, self.window.location());
    }

    pub fn motion(&mut self, cursor: Point) {
        if let Some(location) = self.drag.follow(cursor) {
            self.window.set_location(location);
        }
    }

    pub fn release(&mut self, button: PointerButton) -> Result<(), SettingsError> {
        if button != PointerButton::Primary || !self.drag.finish() {
            return Ok(());
        }
        self.clamp_to_screen();
        log::debug!("Drag finished at {:?}", self.window.location());
        self.save()
    }

    pub fn display_changed(&mut self) -> Result<(), SettingsError> {
        log::info!("Display configuration changed");
        match self.mode {
            PlacementMode::Default => {
                self.apply_default_location();
                Ok(())
            }
            PlacementMode::Manual => {
                self.clamp_to_screen();
                self.save()
            }
        }
    }

    pub fn reset_position(&mut self) -> Result<(), SettingsError> {
        log::info!("Resetting to default placement");
        self.mode = PlacementMode::Default;
        self.apply_default_location();
        self.save()
    }

    /// Use `color` for the clock and persist the choice.
    pub fn select_color(&mut self, color: Argb) -> Result<(), SettingsError> {
        self.apply_color(color);
        self.save()
    }

    /// Let pointer input fall through to whatever is beneath the overlay.
    ///
    /// Disabled at startup so the window can be dragged; nothing turns it on yet.
    pub fn set_click_through(&mut self, enabled: bool) {
        self.click_through = enabled;
        self.window.set_click_through(enabled);
    }

    pub fn settings(&self) -> OverlaySettings {
        let position = match self.mode {
            PlacementMode::Default => None,
            PlacementMode::Manual => Some(self.window.location()),
        };
        OverlaySettings::new(position, self.foreground)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.store.save(&self.settings())
    }

    /// Persist the final state and hand back the window and menu for release.
    pub fn shutdown(self) -> Result<(W, M), SettingsError> {
        log::info!("Saving settings before exit");
        self.save()?;
        Ok((self.window, self.menu))
    }

    /// Hand back the window and menu without saving.
    pub fn into_parts(self) -> (W, M) {
        (self.window, self.menu)
    }

    fn apply_color(&mut self, color: Argb) {
        self.foreground = color;
        self.menu.set_checked_color(palette::checked_index(color));
        if !self.text.is_empty() {
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        let frame = self.face.render(&self.text, self.foreground);
        self.window.present(&frame);
    }

    fn apply_default_location(&mut self) {
        let screen = self.active_screen();
        self.window
            .set_location(placement::default_location(screen, self.window.size()));
    }

    fn clamp_to_screen(&mut self) {
        let screen = self.active_screen();
        let clamped = placement::clamp_location(self.window.location(), screen, self.window.size());
        self.window.set_location(clamped);
    }

    // Before the first placement the window position is meaningless, so the
    // primary screen is used.
    fn active_screen(&self) -> Rect {
        let primary = || self.window.primary_screen().unwrap_or(FALLBACK_SCREEN);
        if !self.did_initial_placement {
            return primary();
        }
        placement::screen_for_point(&self.window.screens(), self.window.location())
            .unwrap_or_else(primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock_overlay::palette::PALETTE;
    use tempfile::TempDir;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    #[derive(Default)]
    struct FakeWindow {
        location: Point,
        size: Size,
        visible: bool,
        screens: Vec<Rect>,
        click_through: Option<bool>,
        presented: usize,
    }

    impl OverlayWindow for FakeWindow {
        fn location(&self) -> Point {
            self.location
        }

        fn set_location(&mut self, location: Point) {
            self.location = location;
        }

        fn size(&self) -> Size {
            self.size
        }

        fn present(&mut self, frame: &RgbaImage) {
            self.size = Size::new(frame.width() as i32, frame.height() as i32);
            self.presented += 1;
        }

        fn show(&mut self) {
            self.visible = true;
        }

        fn screens(&self) -> Vec<Rect> {
            self.screens.clone()
        }

        fn primary_screen(&self) -> Option<Rect> {
            self.screens.first().copied()
        }

        fn set_click_through(&mut self, enabled: bool) {
            self.click_through = Some(enabled);
        }
    }

    #[derive(Default)]
    struct FakeMenu {
        checked: Option<usize>,
    }

    impl ColorMenu for FakeMenu {
        fn set_checked_color(&mut self, index: usize) {
            self.checked = Some(index);
        }
    }

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::at(dir.path().join("settings.json"))
    }

    fn window_on(screens: &[Rect]) -> FakeWindow {
        FakeWindow {
            screens: screens.to_vec(),
            ..FakeWindow::default()
        }
    }

    fn controller(dir: &TempDir, screens: &[Rect]) -> OverlayController<FakeWindow, FakeMenu> {
        OverlayController::new(window_on(screens), FakeMenu::default(), store_in(dir), face())
    }

    fn face() -> ClockFace {
        ClockFace::new().unwrap()
    }

    fn window_size() -> Size {
        face().measure("12:00:00")
    }

    #[test]
    fn starts_in_default_placement_top_right() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        assert_eq!(overlay.mode(), PlacementMode::Default);
        assert!(!overlay.window().visible);

        overlay.refresh("12:00:00");

        let size = window_size();
        assert_eq!(overlay.window().size, size);
        assert_eq!(overlay.window().location, Point::new(1920 - size.width - 150, 0));
        assert!(overlay.window().visible);
    }

    #[test]
    fn startup_disables_click_through_and_checks_default_color() {
        let dir = TempDir::new().unwrap();
        let overlay = controller(&dir, &[SCREEN]);
        assert_eq!(overlay.window().click_through, Some(false));
        assert!(!overlay.is_click_through());
        assert_eq!(overlay.menu().checked, Some(11));
        assert!(!store_in(&dir).path().exists(), "loading must not write settings");
    }

    #[test]
    fn saved_position_starts_manual_and_is_clamped() {
        let dir = TempDir::new().unwrap();
        store_in(&dir)
            .save(&OverlaySettings::new(Some(Point::new(-50, 2000)), PALETTE[2].color))
            .unwrap();

        let mut overlay = controller(&dir, &[SCREEN]);
        assert_eq!(overlay.mode(), PlacementMode::Manual);
        assert_eq!(overlay.foreground(), PALETTE[2].color);
        assert_eq!(overlay.menu().checked, Some(2));

        overlay.refresh("12:00:00");
        assert_eq!(overlay.window().location, Point::new(0, 1080 - window_size().height));
    }

    #[test]
    fn manual_placement_is_not_repinned_on_tick() {
        let dir = TempDir::new().unwrap();
        store_in(&dir)
            .save(&OverlaySettings::new(Some(Point::new(300, 400)), PALETTE[0].color))
            .unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);

        overlay.refresh("12:00:00");
        overlay.refresh("12:00:01");

        assert_eq!(overlay.window().location, Point::new(300, 400));
    }

    #[test]
    fn default_placement_is_repinned_every_tick() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        let pinned = overlay.window().location;

        overlay.window.location = Point::new(5, 5);
        overlay.refresh("12:00:01");

        assert_eq!(overlay.window().location, pinned);
    }

    #[test]
    fn drag_moves_by_cursor_delta_and_saves_on_release() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        overlay.window.location = Point::new(100, 100);

        overlay.press(PointerButton::Primary, Point::new(500, 500));
        assert_eq!(overlay.mode(), PlacementMode::Manual);
        assert!(overlay.is_dragging());

        overlay.motion(Point::new(520, 480));
        assert_eq!(overlay.window().location, Point::new(120, 80));

        overlay.release(PointerButton::Primary).unwrap();
        assert!(!overlay.is_dragging());

        let saved = store_in(&dir).load();
        assert_eq!(saved.position(), Some(Point::new(120, 80)));
    }

    #[test]
    fn release_clamps_to_screen() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        overlay.window.location = Point::new(100, 100);

        overlay.press(PointerButton::Primary, Point::new(150, 110));
        overlay.motion(Point::new(0, 0));
        assert_eq!(overlay.window().location, Point::new(-50, -10));
        overlay.release(PointerButton::Primary).unwrap();

        assert_eq!(overlay.window().location, Point::new(0, 0));
        assert_eq!(store_in(&dir).load().position(), Some(Point::new(0, 0)));
    }

    #[test]
    fn manual_placement_survives_ticks_after_drag() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");

        overlay.press(PointerButton::Primary, Point::new(1700, 20));
        overlay.motion(Point::new(900, 500));
        overlay.release(PointerButton::Primary).unwrap();
        let dropped = overlay.window().location;

        overlay.refresh("12:00:01");
        assert_eq!(overlay.window().location, dropped);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        let before = overlay.window().location;

        overlay.press(PointerButton::Other, Point::new(10, 10));
        overlay.motion(Point::new(300, 300));
        overlay.release(PointerButton::Other).unwrap();

        assert_eq!(overlay.mode(), PlacementMode::Default);
        assert_eq!(overlay.window().location, before);
        assert!(!store_in(&dir).path().exists());
    }

    #[test]
    fn secondary_release_does_not_end_drag() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");

        overlay.press(PointerButton::Primary, Point::new(10, 10));
        overlay.release(PointerButton::Other).unwrap();

        assert!(overlay.is_dragging());
    }

    #[test]
    fn release_without_press_does_nothing() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");

        overlay.release(PointerButton::Primary).unwrap();

        assert!(!store_in(&dir).path().exists());
    }

    #[test]
    fn reset_returns_to_default_and_saves_without_position() {
        let dir = TempDir::new().unwrap();
        store_in(&dir)
            .save(&OverlaySettings::new(Some(Point::new(300, 400)), PALETTE[4].color))
            .unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");

        overlay.reset_position().unwrap();

        assert_eq!(overlay.mode(), PlacementMode::Default);
        assert_eq!(overlay.window().location, Point::new(1920 - window_size().width - 150, 0));
        let saved = store_in(&dir).load();
        assert_eq!(saved.position(), None);
        assert_eq!(saved.foreground(), PALETTE[4].color);
    }

    #[test]
    fn selecting_a_color_checks_it_and_saves() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        let presented = overlay.window().presented;

        overlay.select_color(PALETTE[7].color).unwrap();

        assert_eq!(overlay.menu().checked, Some(7));
        assert_eq!(overlay.window().presented, presented + 1);
        assert_eq!(store_in(&dir).load().foreground(), PALETTE[7].color);
    }

    #[test]
    fn unknown_color_is_applied_but_checks_first_entry() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        let odd = Argb::opaque(0x12, 0x34, 0x56);

        overlay.select_color(odd).unwrap();

        assert_eq!(overlay.foreground(), odd);
        assert_eq!(overlay.menu().checked, Some(0));
        assert_eq!(PALETTE[overlay.menu().checked.unwrap()].name, "Soft White");
    }

    #[test]
    fn display_change_repins_default_without_saving() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");

        overlay.window.screens = vec![Rect::new(0, 0, 2560, 1440)];
        overlay.display_changed().unwrap();

        assert_eq!(overlay.window().location, Point::new(2560 - window_size().width - 150, 0));
        assert!(!store_in(&dir).path().exists());
    }

    #[test]
    fn display_change_clamps_manual_and_saves() {
        let dir = TempDir::new().unwrap();
        store_in(&dir)
            .save(&OverlaySettings::new(Some(Point::new(2300, 1300)), PALETTE[0].color))
            .unwrap();
        let big = Rect::new(0, 0, 2560, 1440);
        let mut overlay = controller(&dir, &[big]);
        overlay.refresh("12:00:00");
        assert_eq!(overlay.window().location, Point::new(2300, 1300));

        overlay.window.screens = vec![SCREEN];
        overlay.display_changed().unwrap();

        let size = window_size();
        let expected = Point::new(1920 - size.width, 1080 - size.height);
        assert_eq!(overlay.window().location, expected);
        assert_eq!(store_in(&dir).load().position(), Some(expected));
    }

    #[test]
    fn default_placement_follows_the_screen_holding_the_window() {
        let dir = TempDir::new().unwrap();
        let second = Rect::new(1920, 0, 1280, 1024);
        let mut overlay = controller(&dir, &[SCREEN, second]);
        overlay.refresh("12:00:00");

        overlay.window.location = Point::new(2000, 300);
        overlay.display_changed().unwrap();

        assert_eq!(overlay.window().location, Point::new(3200 - window_size().width - 150, 0));
    }

    #[test]
    fn no_screens_uses_fallback_bounds() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[]);
        overlay.refresh("12:00:00");
        assert_eq!(overlay.window().location, Point::new(1920 - window_size().width - 150, 0));
    }

    #[test]
    fn shutdown_saves_current_state() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.refresh("12:00:00");
        overlay.press(PointerButton::Primary, Point::new(1700, 10));
        overlay.motion(Point::new(1000, 400));

        let (window, _menu) = overlay.shutdown().unwrap();

        let saved = store_in(&dir).load();
        assert_eq!(saved.position(), Some(window.location));
        assert_eq!(saved.foreground(), palette::DEFAULT_FOREGROUND);
    }

    #[test]
    fn click_through_toggle_reaches_window() {
        let dir = TempDir::new().unwrap();
        let mut overlay = controller(&dir, &[SCREEN]);
        overlay.set_click_through(true);
        assert!(overlay.is_click_through());
        assert_eq!(overlay.window().click_through, Some(true));
    }
}
