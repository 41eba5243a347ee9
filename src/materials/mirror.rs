// Copyright @yucwang 2026

use crate::core::bsdf::{make_sample, Bsdf, BsdfKind, BsdfSample};
use crate::core::interaction::SurfaceParams;
use crate::core::rng::LcgRng;
use crate::materials::reflect;
use crate::math::constants::Vector3f;
use crate::math::spectrum::RGBSpectrum;

/// Perfect mirror. Sampling is deterministic with unit pdf; eval and pdf
/// keep their zero defaults since the reflection is a delta lobe.
pub struct Mirror;

impl Bsdf for Mirror {
    fn kind(&self) -> BsdfKind {
        BsdfKind::Specular
    }

    fn sample(&self, _rng: &mut LcgRng, surf: &SurfaceParams, wo: &Vector3f, _adjoint: bool)
        -> BsdfSample {
        make_sample(reflect(wo, &surf.frame.n), 1.0, RGBSpectrum::splat(1.0), surf, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShadingFrame;
    use crate::math::constants::Vector2f;

    #[test]
    fn test_mirror_reflects() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let surf = SurfaceParams {
            entering: true,
            point: Vector3f::zeros(),
            uv: Vector2f::new(0.0, 0.0),
            face_normal: n,
            frame: ShadingFrame::from_normal(&n),
        };
        let wo = Vector3f::new(1.0, 0.0, 1.0).normalize();
        let mut rng = LcgRng::new(1);
        let s = Mirror.sample(&mut rng, &surf, &wo, false);

        assert_eq!(s.pdf, 1.0);
        assert!((s.wi - Vector3f::new(-wo.x, 0.0, wo.z)).norm() < 1e-6);
        assert!(!s.color.is_black());
    }
}
