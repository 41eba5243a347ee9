// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::ray::Ray3f;

/// Pinhole perspective camera, defined by an eye position, a point to look
/// at, an up vector and a horizontal field of view in degrees.
pub struct PerspectiveSensor {
    eye: Vector3f,
    dir: Vector3f,
    /// Right axis of the image plane, scaled to the half-width at unit depth.
    right: Vector3f,
    /// Up axis of the image plane, scaled to the half-height at unit depth.
    up: Vector3f,
    width: usize,
    height: usize,
}

impl PerspectiveSensor {
    pub fn new(eye: Vector3f, look_at: Vector3f, up: Vector3f, fov: Float,
               width: usize, height: usize) -> Self {
        let dir = (look_at - eye).normalize();
        let right = dir.cross(&up).normalize();
        let up = right.cross(&dir).normalize();

        let w = (fov * PI / 360.0).tan();
        let h = w * height as Float / width as Float;

        Self { eye, dir, right: right * w, up: up * h, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

impl Sensor for PerspectiveSensor {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        // Film coordinates grow right and down; the image plane grows right
        // and up.
        let su = 2.0 * u.x - 1.0;
        let sv = 1.0 - 2.0 * u.y;
        Ray3f::new(self.eye, self.dir + self.right * su + self.up * sv, None, None)
    }

    fn describe(&self) -> String {
        format!("PerspectiveSensor[{}x{}]", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_at_target() {
        let sensor = PerspectiveSensor::new(
            Vector3f::new(0.0, -5.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, 1.0),
            60.0,
            128,
            128,
        );
        let ray = sensor.sample_ray(&Vector2f::new(0.5, 0.5));
        assert!((ray.origin() - Vector3f::new(0.0, -5.0, 1.0)).norm() < 1e-6);
        assert!((ray.dir() - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_horizontal_field_of_view() {
        let fov: Float = 90.0;
        let sensor = PerspectiveSensor::new(
            Vector3f::zeros(),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            fov,
            64,
            64,
        );
        let center = sensor.sample_ray(&Vector2f::new(0.5, 0.5));
        let edge = sensor.sample_ray(&Vector2f::new(0.0, 0.5));
        let cos = center.dir().dot(&edge.dir());
        let expected = (fov * PI / 360.0).cos();
        assert!((cos - expected).abs() < 1e-4);
    }

    #[test]
    fn test_film_orientation() {
        let sensor = PerspectiveSensor::new(
            Vector3f::zeros(),
            Vector3f::new(0.0, 0.0, -1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
            64,
            64,
        );
        // u.y = 0 is the top of the film.
        let top = sensor.sample_ray(&Vector2f::new(0.5, 0.0));
        assert!(top.dir().y > 0.0);
        let left = sensor.sample_ray(&Vector2f::new(0.0, 0.5));
        assert!(left.dir().x < 0.0);
    }
}
