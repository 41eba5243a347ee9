// Copyright @yucwang 2026

use crate::core::bsdf::{make_sample, Bsdf, BsdfKind, BsdfSample};
use crate::core::interaction::SurfaceParams;
use crate::core::rng::LcgRng;
use crate::materials::reflect;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Smooth dielectric boundary between two media, e.g. glass in air. The
/// branch between reflection and refraction is chosen by the Fresnel factor.
pub struct Glass {
    eta_outside: Float,
    eta_inside: Float,
    color: RGBSpectrum,
}

impl Glass {
    pub fn new(eta_outside: Float, eta_inside: Float, color: RGBSpectrum) -> Self {
        Self { eta_outside, eta_inside, color }
    }
}

fn fresnel_factor(n1: Float, n2: Float, cos_i: Float, cos_t: Float) -> Float {
    let r_s = (n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t);
    let r_p = (n2 * cos_i - n1 * cos_t) / (n2 * cos_i + n1 * cos_t);
    (r_s * r_s + r_p * r_p) * 0.5
}

impl Bsdf for Glass {
    fn kind(&self) -> BsdfKind {
        BsdfKind::Specular
    }

    fn sample(&self, rng: &mut LcgRng, surf: &SurfaceParams, wo: &Vector3f, adjoint: bool)
        -> BsdfSample {
        let (k1, k2) = if surf.entering {
            (self.eta_outside, self.eta_inside)
        } else {
            (self.eta_inside, self.eta_outside)
        };
        let n = surf.frame.n;
        let cos_i = wo.dot(&n);

        let k = k1 / k2;
        let cos2_t = 1.0 - k * k * (1.0 - cos_i * cos_i);
        if cos2_t > 0.0 {
            // Refraction, unless the Fresnel lottery picks reflection.
            let cos_t = cos2_t.sqrt();
            let f = fresnel_factor(k1, k2, cos_i, cos_t);
            if rng.next_f32() > f {
                let t = n * (k * cos_i - cos_t) - wo * k;
                // Radiance does not carry the eta^2 scaling, importance does.
                let adjoint_term = if adjoint { k * k } else { 1.0 };
                return make_sample(t, 1.0, self.color * adjoint_term, surf, true);
            }
        }

        // Reflection, including total internal reflection.
        make_sample(reflect(wo, &n), 1.0, self.color, surf, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShadingFrame;
    use crate::math::constants::Vector2f;

    fn surf(entering: bool) -> SurfaceParams {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        SurfaceParams {
            entering,
            point: Vector3f::zeros(),
            uv: Vector2f::new(0.0, 0.0),
            face_normal: n,
            frame: ShadingFrame::from_normal(&n),
        }
    }

    #[test]
    fn test_glass_normal_incidence_mostly_refracts() {
        let glass = Glass::new(1.0, 1.5, RGBSpectrum::splat(1.0));
        let surf = surf(true);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut rng = LcgRng::new(13);

        let mut transmitted = 0;
        for _ in 0..1000 {
            let s = glass.sample(&mut rng, &surf, &wo, false);
            assert_eq!(s.pdf, 1.0);
            if s.wi.z < 0.0 {
                transmitted += 1;
                // Straight through at normal incidence.
                assert!((s.wi - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);
            }
        }
        // Fresnel reflectance at normal incidence is about 4%.
        assert!(transmitted > 900);
    }

    #[test]
    fn test_glass_total_internal_reflection() {
        let glass = Glass::new(1.0, 1.5, RGBSpectrum::splat(1.0));
        // Leaving the dense medium at a grazing angle.
        let surf = surf(false);
        let wo = Vector3f::new(0.95, 0.0, 0.3122).normalize();
        let mut rng = LcgRng::new(4);

        for _ in 0..100 {
            let s = glass.sample(&mut rng, &surf, &wo, false);
            assert!(s.wi.z > 0.0, "TIR must reflect back inside");
        }
    }

    #[test]
    fn test_glass_snell_law() {
        let glass = Glass::new(1.0, 1.5, RGBSpectrum::splat(1.0));
        let surf = surf(true);
        let wo = Vector3f::new(0.5, 0.0, 1.0).normalize();
        let mut rng = LcgRng::new(21);

        let sin_i = wo.x.abs();
        for _ in 0..200 {
            let s = glass.sample(&mut rng, &surf, &wo, false);
            if s.wi.z < 0.0 {
                let sin_t = (s.wi.x * s.wi.x + s.wi.y * s.wi.y).sqrt() / s.wi.norm();
                assert!((sin_i - 1.5 * sin_t).abs() < 1e-4);
                return;
            }
        }
        panic!("no refraction observed");
    }
}
