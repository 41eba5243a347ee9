// Copyright @yucwang 2026

use crate::math::constants::Float;

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform sample in [0, 1).
    pub fn next_f32(&mut self) -> Float {
        const ONE_MINUS_EPS: Float = 1.0 - f32::EPSILON;
        ((self.next_u32() as Float) / (u32::MAX as Float)).min(ONE_MINUS_EPS)
    }
}

/// Initializer for Bernstein's hash function.
pub fn bernstein_init() -> u32 {
    5381
}

/// Hashes 4 bytes using Bernstein's hash.
pub fn bernstein_hash(h: u32, d: u32) -> u32 {
    let mut h = h;
    h = h.wrapping_mul(33) ^ (d & 0xFF);
    h = h.wrapping_mul(33) ^ ((d >> 8) & 0xFF);
    h = h.wrapping_mul(33) ^ ((d >> 16) & 0xFF);
    h = h.wrapping_mul(33) ^ ((d >> 24) & 0xFF);
    h
}

/// Initializer for the FNV hash function.
pub fn fnv_init() -> u32 {
    0x811C9DC5
}

/// Hashes 4 bytes using FNV.
pub fn fnv_hash(h: u32, d: u32) -> u32 {
    let mut h = h;
    h = h.wrapping_mul(16777619) ^ (d & 0xFF);
    h = h.wrapping_mul(16777619) ^ ((d >> 8) & 0xFF);
    h = h.wrapping_mul(16777619) ^ ((d >> 16) & 0xFF);
    h = h.wrapping_mul(16777619) ^ ((d >> 24) & 0xFF);
    h
}

/// Seed for a per-pixel or per-path random stream, decorrelated across both
/// the id and the render iteration.
pub fn sampler_seed(id: u32, iteration: u32) -> u64 {
    fnv_hash(fnv_hash(fnv_init(), id), iteration) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_range() {
        let mut rng = LcgRng::new(42);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn test_sampler_seed_decorrelates() {
        assert_ne!(sampler_seed(0, 1), sampler_seed(1, 1));
        assert_ne!(sampler_seed(0, 1), sampler_seed(0, 2));
        // Reproducible for a fixed (id, iteration) pair.
        assert_eq!(sampler_seed(7, 3), sampler_seed(7, 3));
    }
}
