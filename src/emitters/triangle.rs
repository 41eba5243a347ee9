// Copyright @yucwang 2026

use crate::core::emitter::{
    make_direct_sample, make_emission_sample, DirectSample, EmissionSample, EmissionValue, Emitter,
};
use crate::core::interaction::ShadingFrame;
use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};

/// One-sided triangular area light with cosine-distributed emission.
pub struct TriangleLight {
    v0: Vector3f,
    v1: Vector3f,
    v2: Vector3f,
    n: Vector3f,
    inv_area: Float,
    color: RGBSpectrum,
}

impl TriangleLight {
    pub fn new(v0: Vector3f, v1: Vector3f, v2: Vector3f, color: RGBSpectrum) -> Self {
        let n = (v1 - v0).cross(&(v2 - v0));
        let len = n.norm();
        let area = len * 0.5;
        assert!(area > 0.0, "degenerate light triangle");
        Self { v0, v1, v2, n: n / len, inv_area: 1.0 / area, color }
    }

    /// Uniform point on the triangle, folding the unit square onto the
    /// barycentric simplex.
    fn sample_point(&self, rng: &mut LcgRng) -> Vector3f {
        let mut u = rng.next_f32();
        let mut v = rng.next_f32();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        self.v0 + (self.v1 - self.v0) * u + (self.v2 - self.v0) * v
    }
}

impl Emitter for TriangleLight {
    fn sample_direct(&self, from: &Vector3f, rng: &mut LcgRng) -> DirectSample {
        let pos = self.sample_point(rng);
        let dir = from - pos;
        let cos = dir.dot(&self.n) / dir.norm();
        make_direct_sample(pos, self.color, self.inv_area,
                           sample_cosine_hemisphere_pdf(cos), cos)
    }

    fn sample_emission(&self, rng: &mut LcgRng) -> EmissionSample {
        let pos = self.sample_point(rng);
        let u = Vector2f::new(rng.next_f32(), rng.next_f32());
        let local = sample_cosine_hemisphere(&u);
        let dir = ShadingFrame::from_normal(&self.n).to_world(&local);
        make_emission_sample(pos, dir, self.color, self.inv_area,
                             sample_cosine_hemisphere_pdf(local.z), dir.dot(&self.n))
    }

    fn emission(&self, dir: &Vector3f, _uv: &Vector2f) -> EmissionValue {
        let pdf_dir = sample_cosine_hemisphere_pdf(dir.dot(&self.n));
        if pdf_dir > 0.0 {
            EmissionValue { intensity: self.color, pdf_area: self.inv_area, pdf_dir }
        } else {
            EmissionValue { intensity: RGBSpectrum::black(), pdf_area: 1.0, pdf_dir: 1.0 }
        }
    }

    fn has_area(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_light() -> TriangleLight {
        TriangleLight::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            RGBSpectrum::splat(2.0),
        )
    }

    #[test]
    fn test_triangle_light_emission_side() {
        let light = unit_light();

        // Emission only leaves the front face.
        let front = light.emission(&Vector3f::new(0.0, 0.0, 1.0), &Vector2f::new(0.0, 0.0));
        assert!(!front.intensity.is_black());
        assert!((front.pdf_area - 2.0).abs() < 1e-5);

        let back = light.emission(&Vector3f::new(0.0, 0.0, -1.0), &Vector2f::new(0.0, 0.0));
        assert!(back.intensity.is_black());
    }

    #[test]
    fn test_triangle_light_samples_on_surface() {
        let light = unit_light();
        let mut rng = LcgRng::new(8);

        for _ in 0..200 {
            let s = light.sample_emission(&mut rng);
            // On the z = 0 plane, inside the simplex.
            assert!(s.pos.z.abs() < 1e-6);
            assert!(s.pos.x >= 0.0 && s.pos.y >= 0.0);
            assert!(s.pos.x + s.pos.y <= 1.0 + 1e-5);
            // Directions leave through the front face.
            assert!(s.dir.z >= 0.0);
            assert!(s.cos >= 0.0);
            assert!(s.pdf_area > 0.0 && s.pdf_dir > 0.0);
        }
    }

    #[test]
    fn test_triangle_light_direct_side() {
        let light = unit_light();
        let mut rng = LcgRng::new(15);

        let above = light.sample_direct(&Vector3f::new(0.2, 0.2, 1.0), &mut rng);
        assert!(!above.intensity.is_black());

        // Points behind the light get a zeroed sample.
        let behind = light.sample_direct(&Vector3f::new(0.2, 0.2, -1.0), &mut rng);
        assert!(behind.intensity.is_black());
    }
}
