// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Result from sampling the emitting surface of a light.
#[derive(Debug, Clone, Copy)]
pub struct EmissionSample {
    /// Position on the light source.
    pub pos: Vector3f,
    /// Direction of the light going outwards.
    pub dir: Vector3f,
    pub intensity: RGBSpectrum,
    /// Probability of sampling the point on the light.
    pub pdf_area: Float,
    /// Probability of sampling the direction, conditioned on the point.
    pub pdf_dir: Float,
    /// Cosine between the direction and the light source geometry.
    pub cos: Float,
}

/// Result from sampling direct lighting towards a shading point.
#[derive(Debug, Clone, Copy)]
pub struct DirectSample {
    pub pos: Vector3f,
    pub intensity: RGBSpectrum,
    pub pdf_area: Float,
    pub pdf_dir: Float,
    pub cos: Float,
}

/// Emission value at a point on the light surface.
#[derive(Debug, Clone, Copy)]
pub struct EmissionValue {
    pub intensity: RGBSpectrum,
    pub pdf_area: Float,
    pub pdf_dir: Float,
}

pub trait Emitter: Send + Sync {
    /// Samples direct illumination from this light at the given point.
    fn sample_direct(&self, from: &Vector3f, rng: &mut LcgRng) -> DirectSample;

    /// Samples the emitting surface of the light.
    fn sample_emission(&self, rng: &mut LcgRng) -> EmissionSample;

    /// Emission of the light towards `dir` (only lights with an area).
    fn emission(&self, dir: &Vector3f, uv: &Vector2f) -> EmissionValue;

    /// True if the light has an area, i.e. can be hit by a ray.
    fn has_area(&self) -> bool;
}

/// Guarded constructors: a geometric or probability precondition failure
/// yields a zero-intensity sample with unit pdfs, never a NaN downstream.

pub fn make_emission_sample(
    pos: Vector3f,
    dir: Vector3f,
    intensity: RGBSpectrum,
    pdf_area: Float,
    pdf_dir: Float,
    cos: Float,
) -> EmissionSample {
    if pdf_area > 0.0 && pdf_dir > 0.0 && cos > 0.0 {
        EmissionSample { pos, dir, intensity, pdf_area, pdf_dir, cos }
    } else {
        EmissionSample {
            pos,
            dir,
            intensity: RGBSpectrum::black(),
            pdf_area: 1.0,
            pdf_dir: 1.0,
            cos: 1.0,
        }
    }
}

pub fn make_direct_sample(
    pos: Vector3f,
    intensity: RGBSpectrum,
    pdf_area: Float,
    pdf_dir: Float,
    cos: Float,
) -> DirectSample {
    if pdf_area > 0.0 && pdf_dir > 0.0 && cos > 0.0 {
        DirectSample { pos, intensity, pdf_area, pdf_dir, cos }
    } else {
        DirectSample {
            pos,
            intensity: RGBSpectrum::black(),
            pdf_area: 1.0,
            pdf_dir: 1.0,
            cos: 1.0,
        }
    }
}
