// Copyright @yucwang 2026

use crate::core::bsdf::BsdfKind;
use crate::core::integrator::ProgressiveIntegrator;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::integrators::{default_workers, next_event, render_rows, MAX_DEPTH, RR_MAX};
use crate::math::bitmap::Bitmap;
use crate::math::constants::EPSILON;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::russian_roulette;

/// Unidirectional path tracer with next-event estimation and Russian
/// roulette. Emitter hits only count after specular chains; everything
/// else is covered by the light samples.
pub struct PathTracer {
    threads: Option<usize>,
}

impl PathTracer {
    pub fn new() -> Self {
        Self { threads: None }
    }

    /// Fixed worker count, mainly useful for tests.
    pub fn with_threads(threads: usize) -> Self {
        Self { threads: Some(threads) }
    }
}

impl Default for PathTracer {
    fn default() -> Self {
        Self::new()
    }
}

fn path_trace(scene: &Scene, mut ray: Ray3f, rng: &mut LcgRng) -> RGBSpectrum {
    let mut color = RGBSpectrum::black();
    let mut throughput = RGBSpectrum::splat(1.0);
    let mut prev_kind = BsdfKind::Specular;
    ray.min_t = EPSILON;

    for _ in 0..MAX_DEPTH {
        let hit = match scene.ray_intersect(&ray) {
            Some(hit) => hit,
            None => break,
        };
        let wo = -ray.dir();

        if let Some(light) = scene.emitter_at(hit.tri) {
            // Direct hits only count when next-event estimation could not
            // have sampled this connection.
            if hit.surf.entering && prev_kind == BsdfKind::Specular {
                color += throughput * light.emission(&wo, &hit.surf.uv).intensity;
            }
            break;
        }

        let bsdf = scene.bsdf(hit.material);
        let kind = bsdf.kind();

        if kind != BsdfKind::Specular {
            color += next_event(scene, bsdf, &hit.surf, &wo, rng) * throughput;
        }

        let sample = bsdf.sample(rng, &hit.surf, &wo, false);
        if sample.pdf == 0.0 || sample.color.is_black() {
            break;
        }
        let weight = sample.color * (1.0 / sample.pdf);
        throughput *= weight;
        ray = Ray3f::new(hit.surf.point, sample.wi, Some(EPSILON), None);

        let q = 1.0 - russian_roulette(&weight, RR_MAX);
        if rng.next_f32() < q {
            break;
        }
        throughput *= 1.0 / (1.0 - q);
        prev_kind = kind;
    }

    color
}

impl ProgressiveIntegrator for PathTracer {
    fn render_iteration(&mut self, scene: &Scene, film: &mut Bitmap, iteration: u32) {
        let workers = self.threads.unwrap_or_else(default_workers);
        render_rows(scene, film, workers, iteration, path_trace);
    }
}
