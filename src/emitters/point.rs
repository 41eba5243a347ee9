// Copyright @yucwang 2026

use crate::core::emitter::{
    make_direct_sample, make_emission_sample, DirectSample, EmissionSample, EmissionValue, Emitter,
};
use crate::core::rng::LcgRng;
use crate::math::constants::{Vector2f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_uniform_sphere, sample_uniform_sphere_pdf};

/// Isotropic point light; intensity falls off quadratically with distance.
pub struct PointLight {
    pos: Vector3f,
    color: RGBSpectrum,
}

impl PointLight {
    pub fn new(pos: Vector3f, power: RGBSpectrum) -> Self {
        Self { pos, color: power * (1.0 / (4.0 * PI)) }
    }
}

impl Emitter for PointLight {
    fn sample_direct(&self, _from: &Vector3f, _rng: &mut LcgRng) -> DirectSample {
        make_direct_sample(self.pos, self.color, 1.0, sample_uniform_sphere_pdf(), 1.0)
    }

    fn sample_emission(&self, rng: &mut LcgRng) -> EmissionSample {
        let u = Vector2f::new(rng.next_f32(), rng.next_f32());
        let dir = sample_uniform_sphere(&u);
        make_emission_sample(self.pos, dir, self.color, 1.0, sample_uniform_sphere_pdf(), 1.0)
    }

    fn emission(&self, _dir: &Vector3f, _uv: &Vector2f) -> EmissionValue {
        EmissionValue { intensity: RGBSpectrum::black(), pdf_area: 1.0, pdf_dir: 1.0 }
    }

    fn has_area(&self) -> bool {
        false
    }
}
