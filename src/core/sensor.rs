// Copyright @yucwang 2026

use crate::math::constants::Vector2f;
use crate::math::ray::Ray3f;

pub trait Sensor: Send + Sync {
    /// Generates a primary ray for a point on the film, with `u` in [0,1)^2.
    fn sample_ray(&self, u: &Vector2f) -> Ray3f;

    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
