//! Paper plane silhouettes.
//!
//! Each variant is static mesh data in plane-local space: nose toward `+Z`,
//! wings along `X`, `+Y` up. The renderer uploads the vertices and indices
//! as-is; the simulation only needs [`PlaneModel::tail_offset`] to know where
//! the trail leaves the plane.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Closed set of plane silhouettes that can be swapped at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneModel {
    /// Classic folded dart with a shallow keel.
    #[default]
    Classic,
    /// Narrow, long-nosed dart.
    Dart,
    /// Broad wings, short body.
    Glider,
}

const CLASSIC_VERTICES: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 2.0),   // nose
    Vec3::new(-1.2, 0.1, -1.0), // left wing tip
    Vec3::new(1.2, 0.1, -1.0),  // right wing tip
    Vec3::new(0.0, 0.0, -1.0),  // tail
    Vec3::new(0.0, -0.4, -0.8), // keel
    Vec3::new(0.0, -0.1, 1.2),  // keel front
];

const CLASSIC_INDICES: [u16; 12] = [
    0, 1, 3, //
    0, 3, 2, //
    3, 4, 5, //
    5, 4, 0,
];

const DART_VERTICES: [Vec3; 6] = [
    Vec3::new(0.0, 0.0, 2.8),
    Vec3::new(-0.6, 0.05, -1.2),
    Vec3::new(0.6, 0.05, -1.2),
    Vec3::new(0.0, 0.0, -1.2),
    Vec3::new(0.0, -0.35, -1.0),
    Vec3::new(0.0, -0.05, 1.8),
];

const DART_INDICES: [u16; 12] = [
    0, 1, 3, //
    0, 3, 2, //
    3, 4, 5, //
    5, 4, 0,
];

const GLIDER_VERTICES: [Vec3; 7] = [
    Vec3::new(0.0, 0.0, 1.4),
    Vec3::new(-1.8, 0.2, -0.4),
    Vec3::new(-1.4, 0.2, -0.8),
    Vec3::new(1.4, 0.2, -0.8),
    Vec3::new(1.8, 0.2, -0.4),
    Vec3::new(0.0, 0.0, -0.8),
    Vec3::new(0.0, -0.3, -0.5),
];

const GLIDER_INDICES: [u16; 15] = [
    0, 1, 2, //
    0, 2, 5, //
    0, 5, 3, //
    0, 3, 4, //
    0, 5, 6,
];

impl PlaneModel {
    pub const ALL: [PlaneModel; 3] = [PlaneModel::Classic, PlaneModel::Dart, PlaneModel::Glider];

    pub fn vertices(self) -> &'static [Vec3] {
        match self {
            PlaneModel::Classic => &CLASSIC_VERTICES,
            PlaneModel::Dart => &DART_VERTICES,
            PlaneModel::Glider => &GLIDER_VERTICES,
        }
    }

    /// Triangle list indices into [`vertices`](Self::vertices).
    pub fn indices(self) -> &'static [u16] {
        match self {
            PlaneModel::Classic => &CLASSIC_INDICES,
            PlaneModel::Dart => &DART_INDICES,
            PlaneModel::Glider => &GLIDER_INDICES,
        }
    }

    /// Local-space point the trail is emitted from.
    pub fn tail_offset(self) -> Vec3 {
        match self {
            PlaneModel::Classic => CLASSIC_VERTICES[3],
            PlaneModel::Dart => DART_VERTICES[3],
            PlaneModel::Glider => GLIDER_VERTICES[5],
        }
    }

    /// The next silhouette, wrapping around.
    pub fn next(self) -> Self {
        match self {
            PlaneModel::Classic => PlaneModel::Dart,
            PlaneModel::Dart => PlaneModel::Glider,
            PlaneModel::Glider => PlaneModel::Classic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaneModel::Classic => "classic",
            PlaneModel::Dart => "dart",
            PlaneModel::Glider => "glider",
        }
    }
}
