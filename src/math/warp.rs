// Copyright @yucwang 2023

use super::constants::{ INV_PI, PI, Float, Vector2f, Vector3f };
use super::spectrum::RGBSpectrum;

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let c: Float = 2.0 * u.y - 1.0;
    let s: Float = (1.0 - c * c).max(0.0).sqrt();
    let phi: Float = 2.0 * PI * u.x;

    Vector3f::new(s * phi.cos(), s * phi.sin(), c)
}

pub fn sample_uniform_sphere_pdf() -> Float {
    INV_PI / 4.0
}

pub fn sample_uniform_disk_concentric(u: &Vector2f) -> Vector2f {
    let r1: Float = 2.0 * u.x - 1.0;
    let r2: Float = 2.0 * u.y - 1.0;

    let phi: Float;
    let r:   Float;

    if r1 == 0. && r2 == 0. {
        r = 0.0;
        phi = 0.0;
    } else if r1 * r1 > r2 * r2 {
        r = r1;
        phi = (PI / 4.0) * (r2 / r1);
    } else {
        r = r2;
        phi = (PI / 2.0) - (r1 / r2) * (PI / 4.0);
    }

    let (sin_phi, cos_phi) = phi.sin_cos();

    Vector2f::new(r * cos_phi, r * sin_phi)
}

pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    let p = sample_uniform_disk_concentric(&u);
    let z = (1.0 - p.x * p.x - p.y * p.y).max(0.0).sqrt();

    Vector3f::new(p.x, p.y, z)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

pub fn sample_cosine_power_hemisphere(u: &Vector2f, k: Float) -> Vector3f {
    let cos_theta = u.y.powf(1.0 / (k + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * u.x;

    Vector3f::new(phi.cos() * sin_theta, phi.sin() * sin_theta, cos_theta)
}

pub fn sample_cosine_power_hemisphere_pdf(cos_theta: Float, k: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    cos_theta.powf(k) * (k + 1.0) / (2.0 * PI)
}

/// Survival probability of a path given its current contribution,
/// clamped below one so the compensation never divides by zero.
pub fn russian_roulette(c: &RGBSpectrum, max: Float) -> Float {
    (c.luminance() * 2.0).min(max)
}

/* Tests for warp */
