//! paint3d Core Library - software 3D geometry pipeline
//!
//! Transforms mesh vertices through model, view and projection space, culls
//! back faces and near-plane crossings, shades and depth-sorts what remains,
//! and hands a 2D draw list to any surface that can fill polygons. Convex
//! outlines and point-in-polygon picking work on the same per-frame output.

pub mod error;
pub mod geometry;
pub mod gizmo;
pub mod hit;
pub mod hull;
pub mod math;
pub mod pipeline;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::{CameraSlot, Mesh, Triangle};
pub use gizmo::{Axis, Gizmo};
pub use hit::point_in_polygon;
pub use hull::convex_hull;
pub use math::{Mat4, Point2, Vec3};
pub use pipeline::{render_mesh, FrameStats, Lighting, ShadedTriangle};
pub use projection::{Camera, CameraConfig, ProjectedVertex};
pub use scene::{render_frame, Cameras, Frame, Pick, Scene};
pub use surface::{draw_frame, Color, DrawCommand, DrawOptions, DrawSurface};
pub use transform::TransformState;
