// Copyright @yucwang 2026

use crate::math::constants::{Vector2f, Vector3f};

/// Orthonormal shading frame built around a normal.
#[derive(Debug, Clone, Copy)]
pub struct ShadingFrame {
    pub n: Vector3f,
    pub t: Vector3f,
    pub bt: Vector3f,
}

impl ShadingFrame {
    pub fn from_normal(n: &Vector3f) -> Self {
        let t = if n.x != 0.0 || n.y != 0.0 {
            n.cross(&Vector3f::new(0.0, 0.0, 1.0)).normalize()
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let bt = n.cross(&t);
        Self { n: *n, t, bt }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.t), v.dot(&self.bt), v.dot(&self.n))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.t * v.x + self.bt * v.y + self.n * v.z
    }
}

/// Geometric and shading information at a surface hit point. Handed to
/// BSDFs and integrators; both normals are oriented towards the incoming ray.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceParams {
    /// True when the ray hit the front side of the surface.
    pub entering: bool,
    pub point: Vector3f,
    pub uv: Vector2f,
    pub face_normal: Vector3f,
    pub frame: ShadingFrame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_orthonormal() {
        let n = Vector3f::new(0.3, -0.5, 0.2).normalize();
        let frame = ShadingFrame::from_normal(&n);

        assert!(frame.n.dot(&frame.t).abs() < 1e-5);
        assert!(frame.n.dot(&frame.bt).abs() < 1e-5);
        assert!(frame.t.dot(&frame.bt).abs() < 1e-5);
        assert!((frame.t.norm() - 1.0).abs() < 1e-5);
        assert!((frame.bt.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_frame_round_trip() {
        let n = Vector3f::new(0.0, 1.0, 0.0);
        let frame = ShadingFrame::from_normal(&n);
        let v = Vector3f::new(0.2, 0.4, -0.6);
        let back = frame.to_world(&frame.to_local(&v));
        assert!((back - v).norm() < 1e-5);

        // The degenerate (0, 0, ±1) normal takes the fallback tangent.
        let up = ShadingFrame::from_normal(&Vector3f::new(0.0, 0.0, 1.0));
        assert!((up.t - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
