use std::error::Error;
use std::time::Instant;

use clock_overlay::clock::{self, TICK_INTERVAL};
use clock_overlay::palette::PALETTE;
use clock_overlay::render::ClockFace;
use clock_overlay::{SettingsError, SettingsStore};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};

use crate::controller::{OverlayController, OverlayWindow, PointerButton};
use crate::tray::{self, Tray, TrayCommand};
use crate::window::WinitOverlay;

pub fn run() -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;

    let store = SettingsStore::new();
    log::info!("Settings file: {}", store.path().display());

    let window = WinitOverlay::build(&event_loop)?;
    let tray = Tray::new(tray::tray_image())?;
    let face = ClockFace::new()?;
    let mut app = App::new(OverlayController::new(window, tray, store, face));

    event_loop.run(|event, elwt| app.handle_event(event, elwt))?;
    app.finish()
}

struct App {
    overlay: OverlayController<WinitOverlay, Tray>,
    client_cursor: Option<PhysicalPosition<f64>>,
    next_tick: Instant,
    failure: Option<SettingsError>,
}

impl App {
    fn new(overlay: OverlayController<WinitOverlay, Tray>) -> Self {
        log::info!("{} screen(s) attached", overlay.window().screens().len());
        Self {
            overlay,
            client_cursor: None,
            next_tick: Instant::now(),
            failure: None,
        }
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        match event {
            Event::AboutToWait => {
                self.handle_tray(elwt);
                if self.overlay.window_mut().take_display_change() {
                    self.display_changed(elwt);
                }

                let now = Instant::now();
                if now >= self.next_tick {
                    self.tick();
                    self.next_tick = now + TICK_INTERVAL;
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
            }
            Event::WindowEvent { event, window_id } if window_id == self.overlay.window().id() => {
                self.handle_window_event(event, elwt)
            }
            _ => (),
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::CursorMoved { position, .. } => {
                self.client_cursor = Some(position);
                if let Some(cursor) = self.overlay.window().screen_cursor(Some(position)) {
                    self.overlay.motion(cursor);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    _ => PointerButton::Other,
                };
                match state {
                    ElementState::Pressed => {
                        match self.overlay.window().screen_cursor(self.client_cursor) {
                            Some(cursor) => self.overlay.press(button, cursor),
                            None => log::debug!("Press ignored, cursor position unknown"),
                        }
                    }
                    ElementState::Released => {
                        let result = self.overlay.release(button);
                        self.check(result, elwt);
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => self.display_changed(elwt),
            _ => (),
        }
    }

    fn handle_tray(&mut self, elwt: &EventLoopWindowTarget<()>) {
        for command in self.overlay.menu().poll() {
            log::debug!("Tray command {:?}", command);
            let result = match command {
                TrayCommand::ResetPosition => self.overlay.reset_position(),
                TrayCommand::SelectColor(index) => match PALETTE.get(index) {
                    Some(entry) => {
                        log::info!("Clock color set to {}", entry.name);
                        self.overlay.select_color(entry.color)
                    }
                    None => Ok(()),
                },
                TrayCommand::Exit => {
                    elwt.exit();
                    Ok(())
                }
            };
            self.check(result, elwt);
        }
    }

    fn tick(&mut self) {
        self.overlay.refresh(&clock::now_text());
    }

    fn display_changed(&mut self, elwt: &EventLoopWindowTarget<()>) {
        log::info!("Display configuration changed");
        let result = self.overlay.display_changed();
        self.check(result, elwt);
    }

    /// A failed save ends the event loop; the error is returned from [`run`].
    fn check(&mut self, result: Result<(), SettingsError>, elwt: &EventLoopWindowTarget<()>) {
        if let Err(err) = result {
            log::error!("Saving settings failed: {}", err);
            self.failure.get_or_insert(err);
            elwt.exit();
        }
    }

    fn finish(self) -> Result<(), Box<dyn Error>> {
        if let Some(err) = self.failure {
            let (window, tray) = self.overlay.into_parts();
            tray.hide();
            window.close();
            return Err(err.into());
        }

        log::info!("Shutting down in {:?} placement", self.overlay.mode());
        let (window, tray) = self.overlay.shutdown()?;
        tray.hide();
        window.close();
        Ok(())
    }
}
