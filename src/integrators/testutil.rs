// Copyright @yucwang 2026

use crate::core::scene::{Scene, SceneBuilder};
use crate::materials::diffuse::Diffuse;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::sensors::perspective::PerspectiveSensor;

// A 1x1 lamp one unit above a large diffuse floor, with the camera between
// the two looking straight down. The irradiance at the floor point under
// the lamp center has a closed form, which pins down the whole light
// transport chain of an integrator.

pub(crate) const ALBEDO: Float = 0.5;
pub(crate) const RADIANCE: Float = 1.0;

pub(crate) fn lamp_over_floor(width: usize, height: usize) -> Scene {
    let sensor = PerspectiveSensor::new(
        Vector3f::new(0.0, -0.4, 0.6),
        Vector3f::new(0.0, 0.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        15.0,
        width,
        height,
    );
    let mut builder = SceneBuilder::new(Box::new(sensor));
    let floor = builder.add_material(Box::new(Diffuse::new(RGBSpectrum::splat(ALBEDO))));
    let lamp = builder.add_emissive_material(
        Box::new(Diffuse::new(RGBSpectrum::black())),
        RGBSpectrum::splat(RADIANCE),
    );
    builder.add_quad(
        Vector3f::new(-100.0, -100.0, 0.0),
        Vector3f::new(100.0, -100.0, 0.0),
        Vector3f::new(100.0, 100.0, 0.0),
        Vector3f::new(-100.0, 100.0, 0.0),
        floor,
    );
    // Wound so the lamp normal points down at the floor.
    builder.add_quad(
        Vector3f::new(-0.5, -0.5, 1.0),
        Vector3f::new(-0.5, 0.5, 1.0),
        Vector3f::new(0.5, 0.5, 1.0),
        Vector3f::new(0.5, -0.5, 1.0),
        lamp,
    );
    builder.build()
}

/// Irradiance at the floor point under the center of a rectangular lamp of
/// half-size `x` by `y` at height 1, emitting `RADIANCE`.
fn analytic_irradiance(x: Float, y: Float) -> Float {
    let a = x / (1.0 + x * x).sqrt();
    let b = y / (1.0 + y * y).sqrt();
    let f = (a * (y / (1.0 + x * x).sqrt()).atan()
        + b * (x / (1.0 + y * y).sqrt()).atan())
        / (2.0 * PI);
    PI * RADIANCE * 4.0 * f
}

/// Radiance the camera should see at the center of the floor.
pub(crate) fn expected_center_radiance() -> Float {
    ALBEDO / PI * analytic_irradiance(0.5, 0.5)
}

/// Average red channel over the four central pixels, per iteration.
pub(crate) fn center_average(film: &Bitmap, iterations: u32) -> Float {
    let (w, h) = (film.width(), film.height());
    let mut sum = 0.0;
    for y in (h / 2 - 1)..=(h / 2) {
        for x in (w / 2 - 1)..=(w / 2) {
            sum += film[(x, y)].x;
        }
    }
    sum / (4.0 * iterations as Float)
}
