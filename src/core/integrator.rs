// Copyright @yucwang 2026

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

/// A progressive integrator renders one iteration at a time into a shared
/// accumulation target. Calling it with iteration k+1 after k refines the
/// same underlying image; the iteration counter drives both the random
/// seeds and any per-iteration schedule the integrator keeps. Iterations
/// are numbered from 1.
pub trait ProgressiveIntegrator {
    fn render_iteration(&mut self, scene: &Scene, film: &mut Bitmap, iteration: u32);
}
