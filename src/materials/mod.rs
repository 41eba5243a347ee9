// Copyright @yucwang 2026

pub mod diffuse;
pub mod glass;
pub mod mirror;
pub mod phong;

use crate::math::constants::Vector3f;

/// Mirror reflection of `v` about `n`; both are expected to be unit length
/// and on the same side.
pub fn reflect(v: &Vector3f, n: &Vector3f) -> Vector3f {
    n * (2.0 * v.dot(n)) - v
}
