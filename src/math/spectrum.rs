// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Tristimulus RGB radiance value. All light transport in the renderer is
/// carried in this representation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0f32, 0.0f32, 0.0f32) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn splat(v: Float) -> Self {
        Self { rgb: Vector3f::new(v, v, v) }
    }

    pub fn black() -> Self {
        Self::default()
    }

    pub fn from_vector3(v: Vector3f) -> Self {
        Self { rgb: v }
    }

    pub fn to_vector3(&self) -> Vector3f {
        self.rgb
    }

    pub fn is_black(&self) -> bool {
        for idx in 0..3 {
            if self.rgb[idx] != 0.0f32 {
                return false;
            }
        }

        true
    }

    pub fn luminance(&self) -> Float {
        0.212671 * self.rgb[0] + 0.715160 * self.rgb[1] + 0.072169 * self.rgb[2]
    }

    pub fn lerp(a: &RGBSpectrum, b: &RGBSpectrum, k: Float) -> Self {
        Self { rgb: a.rgb * (1.0 - k) + b.rgb * k }
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { rgb: self.rgb + rhs.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        self.rgb += rhs.rgb;
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { rgb: self.rgb.component_mul(&rhs.rgb) }
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        self.rgb = self.rgb.component_mul(&rhs.rgb);
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { rgb: self.rgb * rhs }
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        self.rgb *= rhs;
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { rgb: self.rgb / rhs }
    }
}

/* Tests for RGBSpectrum */

#[cfg(test)]
mod tests {
    use super::RGBSpectrum;

    #[test]
    fn test_spectrum_ops() {
        let a = RGBSpectrum::new(0.25, 0.5, 1.0);
        let b = RGBSpectrum::splat(2.0);

        let sum = a + b;
        assert!((sum[0] - 2.25).abs() < 1e-6);

        let prod = a * b;
        assert!((prod[2] - 2.0).abs() < 1e-6);

        let scaled = a * 4.0;
        assert!((scaled[0] - 1.0).abs() < 1e-6);

        assert!(RGBSpectrum::black().is_black());
        assert!(!a.is_black());
    }

    #[test]
    fn test_spectrum_luminance() {
        let white = RGBSpectrum::splat(1.0);
        assert!((white.luminance() - 1.0).abs() < 1e-4);
        assert_eq!(RGBSpectrum::black().luminance(), 0.0);
    }
}
