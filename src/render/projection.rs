use crate::choreo::world::Camera;
use crate::foundation::core::{Point, Vec3};

/// Point projected onto the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Screen position in pixels, origin top-left, `y` down.
    pub screen: Point,
    /// Distance along the view axis.
    pub depth: f64,
    /// Pixels per world unit at this depth.
    pub scale: f64,
}

/// Pinhole projection of a [`Camera`] looking at the world origin with `+y` up.
#[derive(Clone, Copy, Debug)]
pub struct ViewProjection {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    focal: f64,
    half_w: f64,
    half_h: f64,
    near: f64,
}

impl ViewProjection {
    /// Nearest depth that still projects.
    pub const NEAR: f64 = 1.0;

    /// Projection for a `width x height` viewport.
    pub fn look_at_origin(camera: &Camera, width: u32, height: u32) -> Self {
        let eye = camera.position;
        let forward = (-eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        // Looking straight up or down: pick any stable right vector.
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or(Vec3::X);
        let up = right.cross(forward);

        let half_w = f64::from(width) / 2.0;
        let half_h = f64::from(height) / 2.0;
        let fov = camera.fov_deg.clamp(1.0, 179.0).to_radians();
        let focal = half_h / (fov / 2.0).tan();

        Self {
            eye,
            right,
            up,
            forward,
            focal,
            half_w,
            half_h,
            near: Self::NEAR,
        }
    }

    /// Project `p`, or `None` when it is behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let d = p - self.eye;
        let depth = d.dot(self.forward);
        if depth < self.near {
            return None;
        }
        let scale = self.focal / depth;
        Some(Projected {
            screen: Point::new(
                self.half_w + d.dot(self.right) * scale,
                self.half_h - d.dot(self.up) * scale,
            ),
            depth,
            scale,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/projection.rs"]
mod tests;
