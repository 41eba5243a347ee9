// Copyright @yucwang 2026

pub mod path;
pub mod sppm;

#[cfg(test)]
pub(crate) mod testutil;

use crate::core::bsdf::Bsdf;
use crate::core::interaction::SurfaceParams;
use crate::core::rng::{sampler_seed, LcgRng};
use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Hard cap on path length; Russian roulette or gather termination ends
/// paths long before this in practice.
pub(crate) const MAX_DEPTH: usize = 64;

/// Maximum Russian roulette survival probability.
pub(crate) const RR_MAX: Float = 0.75;

/// Next-event estimation: one light sample towards the shading point,
/// converted to a solid-angle pdf and shadow-tested. The returned value
/// excludes the path throughput.
pub(crate) fn next_event(
    scene: &Scene,
    bsdf: &dyn Bsdf,
    surf: &SurfaceParams,
    wo: &Vector3f,
    rng: &mut LcgRng,
) -> RGBSpectrum {
    let (light, p_light) = scene.sample_emitter(rng);
    let ls = light.sample_direct(&surf.point, rng);
    if ls.intensity.is_black() {
        return RGBSpectrum::black();
    }

    let d = ls.pos - surf.point;
    let dist = d.norm();
    if dist <= EPSILON {
        return RGBSpectrum::black();
    }
    let dir = d / dist;

    let p_ne = ls.pdf_area * (dist * dist / ls.cos) * p_light;
    if p_ne <= 0.0 || scene.occluded(&surf.point, &ls.pos) {
        return RGBSpectrum::black();
    }

    let cos = dir.dot(&surf.frame.n).max(0.0);
    bsdf.eval(&dir, surf, wo) * ls.intensity * (cos / p_ne)
}

/// Row-parallel eye pass driver. Workers pull rows off a shared counter,
/// trace one jittered primary ray per pixel and hand finished rows back
/// over a channel; only the calling thread touches the film. Every pixel
/// seeds its own sampler from `(pixel index, seed_stream)`, so the image
/// does not depend on the worker count.
pub(crate) fn render_rows<F>(scene: &Scene, film: &mut Bitmap, workers: usize,
                             seed_stream: u32, trace: F)
where
    F: Fn(&Scene, Ray3f, &mut LcgRng) -> RGBSpectrum + Sync,
{
    let width = film.width();
    let height = film.height();

    let next_row = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Vec<RGBSpectrum>)>();

    thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next_row = &next_row;
            let trace = &trace;
            s.spawn(move || loop {
                let y = next_row.fetch_add(1, Ordering::Relaxed);
                if y >= height {
                    break;
                }
                let mut row = Vec::with_capacity(width);
                for x in 0..width {
                    let mut rng =
                        LcgRng::new(sampler_seed((y * width + x) as u32, seed_stream));
                    let u = Vector2f::new(
                        (x as Float + rng.next_f32()) / width as Float,
                        (y as Float + rng.next_f32()) / height as Float,
                    );
                    let ray = scene.sensor().sample_ray(&u);
                    row.push(trace(scene, ray, &mut rng));
                }
                if tx.send((y, row)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (y, row) in rx {
            film.accumulate_row(y, &row);
        }
    });
}

pub(crate) fn default_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
