// Copyright @yucwang 2026

use crate::core::bsdf::{make_sample, Bsdf, BsdfKind, BsdfSample};
use crate::core::interaction::{ShadingFrame, SurfaceParams};
use crate::core::rng::LcgRng;
use crate::materials::reflect;
use crate::math::constants::{Float, Vector2f, Vector3f, PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_power_hemisphere, sample_cosine_power_hemisphere_pdf};

/// Specular lobe of the modified (energy-conserving) Phong model.
pub struct GlossyPhong {
    albedo: RGBSpectrum,
    exponent: Float,
    norm: Float,
}

impl GlossyPhong {
    pub fn new(albedo: RGBSpectrum, exponent: Float) -> Self {
        Self {
            albedo,
            exponent,
            norm: (exponent + 2.0) / (2.0 * PI),
        }
    }
}

impl Bsdf for GlossyPhong {
    fn kind(&self) -> BsdfKind {
        BsdfKind::Glossy
    }

    fn eval(&self, wi: &Vector3f, surf: &SurfaceParams, wo: &Vector3f) -> RGBSpectrum {
        let p = wi.dot(&reflect(wo, &surf.frame.n)).max(0.0);
        self.albedo * (p.powf(self.exponent) * self.norm)
    }

    fn sample(&self, rng: &mut LcgRng, surf: &SurfaceParams, wo: &Vector3f, _adjoint: bool)
        -> BsdfSample {
        // The lobe is sampled around the mirror direction, then weighted by
        // the cosine to the actual surface normal.
        let r = reflect(wo, &surf.frame.n);
        let u = Vector2f::new(rng.next_f32(), rng.next_f32());
        let local = sample_cosine_power_hemisphere(&u, self.exponent);
        let dir = ShadingFrame::from_normal(&r).to_world(&local);

        let p = dir.dot(&r).max(0.0);
        let cos = dir.dot(&surf.frame.n).max(0.0);
        make_sample(
            dir,
            sample_cosine_power_hemisphere_pdf(p, self.exponent),
            self.albedo * (cos * p.powf(self.exponent) * self.norm),
            surf,
            false,
        )
    }

    fn pdf(&self, wi: &Vector3f, surf: &SurfaceParams, wo: &Vector3f) -> Float {
        let p = wi.dot(&reflect(wo, &surf.frame.n)).max(0.0);
        sample_cosine_power_hemisphere_pdf(p, self.exponent)
    }
}
