// Copyright @yucwang 2026

use crate::core::bsdf::{make_sample, Bsdf, BsdfKind, BsdfSample};
use crate::core::interaction::SurfaceParams;
use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f, Vector3f, INV_PI};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};

/// Purely Lambertian material.
pub struct Diffuse {
    albedo: RGBSpectrum,
}

impl Diffuse {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo }
    }
}

impl Bsdf for Diffuse {
    fn kind(&self) -> BsdfKind {
        BsdfKind::Diffuse
    }

    fn eval(&self, _wi: &Vector3f, _surf: &SurfaceParams, _wo: &Vector3f) -> RGBSpectrum {
        self.albedo * INV_PI
    }

    fn sample(&self, rng: &mut LcgRng, surf: &SurfaceParams, _wo: &Vector3f, _adjoint: bool)
        -> BsdfSample {
        let u = Vector2f::new(rng.next_f32(), rng.next_f32());
        let local = sample_cosine_hemisphere(&u);
        let dir = surf.frame.to_world(&local);
        let cos = dir.dot(&surf.frame.n).max(0.0);
        make_sample(
            dir,
            sample_cosine_hemisphere_pdf(local.z),
            self.albedo * (cos * INV_PI),
            surf,
            false,
        )
    }

    fn pdf(&self, wi: &Vector3f, surf: &SurfaceParams, _wo: &Vector3f) -> Float {
        sample_cosine_hemisphere_pdf(wi.dot(&surf.frame.n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShadingFrame;

    fn surf_up() -> SurfaceParams {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        SurfaceParams {
            entering: true,
            point: Vector3f::zeros(),
            uv: Vector2f::new(0.0, 0.0),
            face_normal: n,
            frame: ShadingFrame::from_normal(&n),
        }
    }

    #[test]
    fn test_diffuse_sample_above_surface() {
        let bsdf = Diffuse::new(RGBSpectrum::splat(0.8));
        let surf = surf_up();
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = LcgRng::new(5);

        for _ in 0..100 {
            let s = bsdf.sample(&mut rng, &surf, &wo, false);
            assert!(s.wi.z >= 0.0);
            assert!(s.pdf > 0.0);
            // color / pdf collapses to the albedo for cosine sampling.
            let ratio = s.color * (1.0 / s.pdf);
            assert!((ratio[0] - 0.8).abs() < 1e-3);
        }
    }

    #[test]
    fn test_diffuse_eval_is_albedo_over_pi() {
        let bsdf = Diffuse::new(RGBSpectrum::splat(0.5));
        let surf = surf_up();
        let v = Vector3f::new(0.0, 0.0, 1.0);
        let f = bsdf.eval(&v, &surf, &v);
        assert!((f[0] - 0.5 * INV_PI).abs() < 1e-6);
    }
}
