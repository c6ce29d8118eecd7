//! Camera and projection utilities

use crate::error::{Error, Result};
use crate::math::{transform_homogeneous, transform_point, try_normalize, Mat4, Vec3};

/// Steepest pitch `orbit` allows, keeps the view basis away from the poles
const MAX_PITCH_DEGREES: f32 = 89.0;

/// Projection parameters, validated when a camera is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub focal_length: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Screen-space origin of the viewport, lets an overlay camera draw
    /// into a sub-rectangle of the surface
    pub viewport_x: f32,
    pub viewport_y: f32,
    pub near: f32,
}

impl CameraConfig {
    pub fn new(focal_length: f32, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            focal_length,
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    pub fn with_near(mut self, near: f32) -> Self {
        self.near = near;
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.viewport_x = x;
        self.viewport_y = y;
        self
    }

    /// Reject non-positive or non-finite values
    pub fn validate(&self) -> Result<()> {
        positive("focal_length", self.focal_length)?;
        positive("near", self.near)?;
        positive("viewport_width", self.viewport_width as f32)?;
        positive("viewport_height", self.viewport_height as f32)?;
        for (field, value) in [("viewport_x", self.viewport_x), ("viewport_y", self.viewport_y)] {
            if !value.is_finite() {
                return Err(Error::InvalidCamera { field, value });
            }
        }
        Ok(())
    }

    fn center(&self) -> (f32, f32) {
        (
            self.viewport_x + self.viewport_width as f32 / 2.0,
            self.viewport_y + self.viewport_height as f32 / 2.0,
        )
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focal_length: 500.0,
            viewport_width: 800,
            viewport_height: 600,
            viewport_x: 0.0,
            viewport_y: 0.0,
            near: 0.1,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidCamera { field, value })
    }
}

/// A vertex after projection: screen position plus camera-space depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedVertex {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// A perspective camera.
///
/// The view basis is `forward = normalize(target - position)`,
/// `right = normalize(up x forward)`, `camera_up = forward x right`, so
/// camera-space z grows away from the viewer.
///
/// Screen coordinates follow the 2D canvas convention (y grows downward),
/// and `up` is the world direction that maps to growing screen y. With the
/// default `up = +Y` the world is right-handed with +Y pointing down the
/// screen, and a face whose winding is counter-clockwise on screen has its
/// normal pointing at the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    config: CameraConfig,
    view: Mat4,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3, config: CameraConfig) -> Result<Self> {
        config.validate()?;
        let view = view_matrix(&position, &target, &up)?;
        Ok(Self {
            position,
            target,
            up,
            config,
            view,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// World to camera space
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Re-aim the camera. The camera is left untouched on error.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, up: Vec3) -> Result<()> {
        self.view = view_matrix(&position, &target, &up)?;
        self.position = position;
        self.target = target;
        self.up = up;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let config = CameraConfig {
            viewport_width: width,
            viewport_height: height,
            ..self.config
        };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Orbit around the target about the world Y axis (yaw) and the
    /// camera's horizontal axis (pitch), keeping the distance.
    pub fn orbit(&mut self, yaw_degrees: f32, pitch_degrees: f32) -> Result<()> {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < crate::math::EPSILON {
            return Err(Error::DegenerateView);
        }
        let yaw = offset.x.atan2(offset.z) + yaw_degrees.to_radians();
        let max_pitch = MAX_PITCH_DEGREES.to_radians();
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + pitch_degrees.to_radians())
            .clamp(-max_pitch, max_pitch);
        let offset = Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        ) * radius;
        self.look_at(self.target + offset, self.target, self.up)
    }

    /// Move toward (positive) or away from (negative) the target. The camera
    /// never passes the target.
    pub fn dolly(&mut self, distance: f32) -> Result<()> {
        let offset = self.position - self.target;
        let radius = offset.norm();
        let direction = try_normalize(&offset).ok_or(Error::DegenerateView)?;
        let radius = (radius - distance).max(self.config.near * 2.0);
        self.look_at(self.target + direction * radius, self.target, self.up)
    }

    /// Copy another camera's viewing direction, staying `distance` from this
    /// camera's own target. Used to keep overlay geometry oriented like the
    /// scene without inheriting the scene camera's zoom or position.
    pub fn follow_orientation(&mut self, other: &Camera, distance: f32) -> Result<()> {
        let direction = try_normalize(&(other.position - other.target)).ok_or(Error::DegenerateView)?;
        self.look_at(self.target + direction * distance, self.target, other.up)
    }

    pub fn to_camera_space(&self, world: &Vec3) -> Vec3 {
        transform_point(&self.view, world)
    }

    /// Perspective matrix with w = z:
    /// `screen = (x · f / z + cx, y · f / z + cy)` after the divide.
    pub fn projection_matrix(&self) -> Mat4 {
        let f = self.config.focal_length;
        let (cx, cy) = self.config.center();
        Mat4::new(
            f, 0.0, cx, 0.0, //
            0.0, f, cy, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        )
    }

    /// Project a camera-space point. `None` when it lies at or behind the
    /// near plane.
    pub fn project(&self, camera_point: &Vec3) -> Option<ProjectedVertex> {
        if camera_point.z <= self.config.near {
            return None;
        }
        let screen = transform_homogeneous(&self.projection_matrix(), camera_point)?;
        Some(ProjectedVertex {
            x: screen.x,
            y: screen.y,
            depth: camera_point.z,
        })
    }

    pub fn project_world(&self, world: &Vec3) -> Option<ProjectedVertex> {
        self.project(&self.to_camera_space(world))
    }
}

impl Default for Camera {
    /// Looking at the origin from ten units down -Z
    fn default() -> Self {
        let position = Vec3::new(0.0, 0.0, -10.0);
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            config: CameraConfig::default(),
            // forward +Z, right +X, up +Y: the basis is the identity
            view: Mat4::new_translation(&-position),
        }
    }
}

fn view_matrix(position: &Vec3, target: &Vec3, up: &Vec3) -> Result<Mat4> {
    let forward = try_normalize(&(target - position)).ok_or(Error::DegenerateView)?;
    let right = try_normalize(&up.cross(&forward)).ok_or(Error::DegenerateView)?;
    let camera_up = forward.cross(&right);
    Ok(Mat4::new(
        right.x, right.y, right.z, -right.dot(position), //
        camera_up.x, camera_up.y, camera_up.z, -camera_up.dot(position), //
        forward.x, forward.y, forward.z, -forward.dot(position), //
        0.0, 0.0, 0.0, 1.0,
    ))
}
