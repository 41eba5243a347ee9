// Copyright @yucwang 2026

use crate::core::interaction::SurfaceParams;
use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Classification of BSDF shapes. The set is closed and integrators branch
/// on it, so it is an enum rather than a trait-level query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsdfKind {
    /// Mostly uniform, no major features. Photon gathering happens here.
    Diffuse,
    /// Hard for photon mapping, handled with next-event estimation.
    Glossy,
    /// Purely specular, merging/connections are not possible.
    Specular,
}

/// Sample returned by a BSDF, including direction, pdf and color.
#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    /// Sampled incoming direction, in world space.
    pub wi: Vector3f,
    pub pdf: Float,
    /// Sample contribution. Includes the cosine term.
    pub color: RGBSpectrum,
}

pub trait Bsdf: Send + Sync {
    fn kind(&self) -> BsdfKind;

    /// Evaluates the BSDF for a pair of world-space directions. Does NOT
    /// include the cosine term.
    fn eval(&self, _wi: &Vector3f, _surf: &SurfaceParams, _wo: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::black()
    }

    /// Samples an incoming direction given the outgoing one. The returned
    /// contribution DOES include the cosine term. `adjoint` is set when the
    /// caller traces light paths instead of eye paths.
    fn sample(&self, rng: &mut LcgRng, surf: &SurfaceParams, wo: &Vector3f, adjoint: bool)
        -> BsdfSample;

    /// Probability of sampling `wi` through `sample`.
    fn pdf(&self, _wi: &Vector3f, _surf: &SurfaceParams, _wo: &Vector3f) -> Float {
        0.0
    }
}

/// Single construction policy for BSDF samples: whenever the pdf vanishes or
/// the direction falls on the wrong side of the surface, the sample degrades
/// to a zero-color, pdf-one sample instead of propagating NaNs. `inverted`
/// is set for transmission samples which are expected under the surface.
pub fn make_sample(
    dir: Vector3f,
    pdf: Float,
    color: RGBSpectrum,
    surf: &SurfaceParams,
    inverted: bool,
) -> BsdfSample {
    if pdf > 0.0 && (inverted ^ (dir.dot(&surf.face_normal) > 0.0)) {
        BsdfSample { wi: dir, pdf, color }
    } else {
        BsdfSample { wi: dir, pdf: 1.0, color: RGBSpectrum::black() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShadingFrame;
    use crate::math::constants::Vector2f;

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
    fn test_make_sample_rejects_zero_pdf() {
        let surf = surf_up();
        let s = make_sample(Vector3f::new(0.0, 0.0, 1.0), 0.0, RGBSpectrum::splat(1.0), &surf, false);
        assert!(s.color.is_black());
        assert_eq!(s.pdf, 1.0);
    }

    #[test]
    fn test_make_sample_rejects_wrong_side() {
        let surf = surf_up();
        let below = Vector3f::new(0.0, 0.0, -1.0);
        let s = make_sample(below, 0.5, RGBSpectrum::splat(1.0), &surf, false);
        assert!(s.color.is_black());

        // Transmission expects the direction under the surface.
        let t = make_sample(below, 0.5, RGBSpectrum::splat(1.0), &surf, true);
        assert!(!t.color.is_black());
        assert_eq!(t.pdf, 0.5);
    }
}
