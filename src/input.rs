//! Pointer input for steering.
//!
//! [`PointerInput`] follows cursor and touch movement from winit window
//! events and turns each movement into a world-space [`Target`] through a
//! [`TargetMapping`]. Feed the result straight into
//! [`FlightSim::on_target_update`](crate::FlightSim::on_target_update):
//!
//! ```ignore
//! fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
//!     if let Some(target) = self.pointer.handle_event(&event) {
//!         self.sim.on_target_update(target);
//!     }
//! }
//! ```

use crate::driver::Target;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use winit::event::{TouchPhase, WindowEvent};

/// Maps normalized device coordinates onto a plane in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetMapping {
    /// World distance from the center to the right and top screen edges.
    pub half_extent: Vec2,
    /// World `z` of the target plane.
    pub depth: f32,
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self {
            half_extent: Vec2::new(600.0, 400.0),
            depth: 0.0,
        }
    }
}

impl TargetMapping {
    pub fn new(half_extent: Vec2, depth: f32) -> Self {
        Self { half_extent, depth }
    }

    /// World point under `ndc`.
    pub fn map(&self, ndc: Vec2) -> Vec3 {
        (ndc * self.half_extent).extend(self.depth)
    }
}

/// Convert a pixel position to normalized device coordinates.
///
/// Origin at the window center, `x` right, `y` up. `None` for a zero-sized
/// window.
pub fn screen_to_ndc(position: Vec2, window_size: (u32, u32)) -> Option<Vec2> {
    let (w, h) = window_size;
    if w == 0 || h == 0 {
        return None;
    }
    Some(Vec2::new(
        (position.x / w as f32) * 2.0 - 1.0,
        1.0 - (position.y / h as f32) * 2.0, // Y flipped
    ))
}

/// Tracks the pointer and produces steering targets.
#[derive(Debug, Clone)]
pub struct PointerInput {
    mapping: TargetMapping,
    window_size: (u32, u32),
    position: Vec2,
    ndc: Vec2,
    moves: u64,
}

impl PointerInput {
    pub fn new(mapping: TargetMapping) -> Self {
        Self {
            mapping,
            window_size: (800, 600),
            position: Vec2::ZERO,
            ndc: Vec2::ZERO,
            moves: 0,
        }
    }

    /// Pointer position in window pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Pointer position in normalized device coordinates.
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Number of pointer movements seen so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn mapping(&self) -> &TargetMapping {
        &self.mapping
    }

    pub fn set_mapping(&mut self, mapping: TargetMapping) {
        self.mapping = mapping;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Record a pointer move to `position` (pixels) and return the new target.
    pub fn pointer_moved(&mut self, position: Vec2) -> Option<Target> {
        let ndc = screen_to_ndc(position, self.window_size)?;
        self.position = position;
        self.ndc = ndc;
        self.moves += 1;
        Some(Target::from(self.mapping.map(ndc)))
    }

    /// Process a winit window event. Returns a target when the pointer moved.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Target> {
        match event {
            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started | TouchPhase::Moved => {
                    self.pointer_moved(Vec2::new(touch.location.x as f32, touch.location.y as f32))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl Default for PointerInput {
    fn default() -> Self {
        Self::new(TargetMapping::default())
    }
}
