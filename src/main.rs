//! Windowed driver: the cursor steers the plane, the redraw loop runs the
//! simulation. Drawing is left to a renderer; this binary reports the pose
//! and trail through the log (`RUST_LOG=info` or `debug`).
//!
//! Usage: `skytrail [config.json]`
//!
//! Keys: `Space` cycles the plane model, `P` pauses, `R` restarts the session.

use std::sync::Arc;

use skytrail::prelude::*;
use skytrail::RunError;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Frames between pose reports.
const REPORT_EVERY: u64 = 120;

struct App {
    window: Option<Arc<Window>>,
    sim: FlightSim,
    pointer: PointerInput,
    clock: FrameClock,
    error: Option<RunError>,
}

impl App {
    fn new(config: FlightConfig) -> Self {
        let pointer = PointerInput::new(config.mapping);
        let clock = FrameClock::new().with_max_delta(config.clock.max_delta);
        Self {
            window: None,
            sim: FlightSim::new(config),
            pointer,
            clock,
            error: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Space => {
                let model = self.sim.model().next();
                self.sim.set_model(model);
                log::info!("plane model: {}", model.name());
            }
            KeyCode::KeyP => {
                self.clock.toggle_pause();
                log::info!("paused: {}", self.clock.is_paused());
            }
            KeyCode::KeyR => {
                self.sim.reset();
                self.clock.reset();
                log::info!("session restarted");
            }
            _ => {}
        }
    }

    fn frame(&mut self) {
        let delta = self.clock.tick();
        if self.clock.was_clamped() {
            log::warn!("frame stalled, delta clamped to {:.3}", delta);
        }
        if !self.sim.on_frame(delta) {
            return;
        }

        if self.sim.frames() % REPORT_EVERY == 0 {
            let pose = self.sim.pose();
            log::info!(
                "{:?} pos ({:.1}, {:.1}, {:.1}) trail {}/{} fps {:.0}",
                self.sim.phase(),
                pose.position.x,
                pose.position.y,
                pose.position.z,
                self.sim.pool().active_count(),
                self.sim.pool().capacity(),
                self.clock.fps()
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("skytrail")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                self.pointer.set_window_size(size.width, size.height);
                window.request_redraw();
                self.window = Some(Arc::new(window));
                self.clock.reset();
            }
            Err(e) => {
                self.error = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(target) = self.pointer.handle_event(&event) {
            self.sim.on_target_update(target);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(key);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn run() -> Result<(), RunError> {
    let config = match std::env::args().nth(1) {
        Some(path) => FlightConfig::load(path)?,
        None => FlightConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
