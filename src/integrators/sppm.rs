// Copyright @yucwang 2026

use crate::accel::hash_grid::HashGrid;
use crate::core::bsdf::BsdfKind;
use crate::core::integrator::ProgressiveIntegrator;
use crate::core::rng::{sampler_seed, LcgRng};
use crate::core::scene::Scene;
use crate::integrators::{default_workers, next_event, render_rows, MAX_DEPTH, RR_MAX};
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON, INV_PI};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::russian_roulette;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Radius shrink rate; the gather radius decays as iter^(-(1 - ALPHA) / 2).
const ALPHA: Float = 0.75;

/// Light paths handed out to photon workers in chunks of this many.
const PHOTON_CHUNK: usize = 4096;

/// One photon deposit: the path contribution, the direction it arrived
/// from, and where it landed.
struct Photon {
    contrib: RGBSpectrum,
    in_dir: Vector3f,
    pos: Vector3f,
}

/// Stochastic progressive photon mapping. Every iteration traces one light
/// path per pixel into a fresh photon map, then gathers at the first
/// diffuse eye-path vertex; specular vertices bounce deterministically and
/// glossy vertices fall back to next-event estimation. The gather radius
/// shrinks across iterations so the accumulated image converges.
pub struct SppmIntegrator {
    /// Twice the average pixel footprint, estimated on the first iteration
    /// and fixed for the rest of the session.
    base_radius: Option<Float>,
    threads: Option<usize>,
}

impl SppmIntegrator {
    pub fn new() -> Self {
        Self { base_radius: None, threads: None }
    }

    /// Fixed worker count, mainly useful for tests.
    pub fn with_threads(threads: usize) -> Self {
        Self { base_radius: None, threads: Some(threads) }
    }

    /// Gather radius used at a given iteration (numbered from 1).
    pub fn query_radius(base_radius: Float, iteration: u32) -> Float {
        base_radius / (iteration as Float).powf(0.5 * (1.0 - ALPHA))
    }
}

impl Default for SppmIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Average world-space distance between neighboring pixels, probed on every
/// 8th pixel with a 2x2 bundle of rays 4 pixels apart. Pairs landing on
/// different triangles are discarded.
fn estimate_pixel_size(scene: &Scene, width: usize, height: usize) -> Float {
    let mut total_dist = 0.0;
    let mut total_count = 0u32;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let mut tris = [None; 4];
            let mut points = [Vector3f::zeros(); 4];
            for i in 0..4 {
                let px = (x + if i % 2 == 1 { 4 } else { 0 }) as Float;
                let py = (y + if i / 2 == 1 { 4 } else { 0 }) as Float;
                let u = Vector2f::new(px / width as Float, py / height as Float);
                let ray = scene.sensor().sample_ray(&u);
                if let Some(hit) = scene.ray_intersect(&ray) {
                    tris[i] = Some(hit.tri);
                    points[i] = ray.at(hit.t);
                }
            }
            let mut pair = |i: usize, j: usize| {
                if tris[i].is_some() && tris[i] == tris[j] {
                    total_dist += (points[i] - points[j]).norm();
                    total_count += 1;
                }
            };
            pair(0, 1);
            pair(2, 3);
            pair(0, 2);
            pair(1, 3);
            x += 8;
        }
        y += 8;
    }

    if total_count > 0 {
        total_dist / (4.0 * total_count as Float)
    } else {
        1.0
    }
}

/// Traces one light path and appends a photon at every non-specular,
/// non-emissive hit. The path energy starts at the emission sample divided
/// by its full sampling pdf and is attenuated at every bounce.
fn trace_photon(scene: &Scene, rng: &mut LcgRng, photons: &mut Vec<Photon>) {
    let (light, p_light) = scene.sample_emitter(rng);
    let ls = light.sample_emission(rng);
    if ls.intensity.is_black() {
        return;
    }

    let mut energy = ls.intensity * (ls.cos / (p_light * ls.pdf_area * ls.pdf_dir));
    let mut ray = Ray3f::new(ls.pos, ls.dir, Some(EPSILON), None);

    for _ in 0..MAX_DEPTH {
        let hit = match scene.ray_intersect(&ray) {
            Some(hit) => hit,
            None => break,
        };
        let wo = -ray.dir();

        // Light sources absorb photons.
        if scene.emitter_at(hit.tri).is_some() {
            break;
        }

        let bsdf = scene.bsdf(hit.material);
        if bsdf.kind() != BsdfKind::Specular {
            photons.push(Photon { contrib: energy, in_dir: wo, pos: hit.surf.point });
        }

        let sample = bsdf.sample(rng, &hit.surf, &wo, true);
        if sample.pdf == 0.0 || sample.color.is_black() {
            break;
        }
        let weight = sample.color * (1.0 / sample.pdf);
        energy *= weight;
        ray = Ray3f::new(hit.surf.point, sample.wi, Some(EPSILON), None);

        let q = 1.0 - russian_roulette(&weight, RR_MAX);
        if rng.next_f32() < q {
            break;
        }
        energy *= 1.0 / (1.0 - q);
    }
}

/// Traces all light paths for one iteration. Workers pull fixed chunks of
/// path indices and each path seeds its own sampler, so the merged photon
/// list is the same for any worker count.
fn trace_light_paths(scene: &Scene, path_count: usize, workers: usize, seed_stream: u32)
    -> Vec<Photon> {
    let num_chunks = (path_count + PHOTON_CHUNK - 1) / PHOTON_CHUNK;
    let next_chunk = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Vec<Photon>)>();

    let mut chunks: Vec<(usize, Vec<Photon>)> = thread::scope(|s| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next_chunk = &next_chunk;
            s.spawn(move || loop {
                let c = next_chunk.fetch_add(1, Ordering::Relaxed);
                if c >= num_chunks {
                    break;
                }
                let first = c * PHOTON_CHUNK;
                let last = (first + PHOTON_CHUNK).min(path_count);
                let mut buffer = Vec::new();
                for i in first..last {
                    let mut rng = LcgRng::new(sampler_seed(i as u32, seed_stream));
                    trace_photon(scene, &mut rng, &mut buffer);
                }
                if tx.send((c, buffer)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
        rx.iter().collect()
    });

    chunks.sort_unstable_by_key(|(c, _)| *c);
    chunks.into_iter().flat_map(|(_, buffer)| buffer).collect()
}

/// Traces one eye path. Photons are only gathered at the first diffuse
/// vertex, with an Epanechnikov kernel over the query disk; the path ends
/// there.
fn eye_trace(
    scene: &Scene,
    mut ray: Ray3f,
    rng: &mut LcgRng,
    photons: &[Photon],
    grid: &HashGrid,
    radius: Float,
) -> RGBSpectrum {
    let mut color = RGBSpectrum::black();
    let mut throughput = RGBSpectrum::splat(1.0);
    let mut last_kind = BsdfKind::Specular;
    ray.min_t = EPSILON;

    for _ in 0..MAX_DEPTH {
        let hit = match scene.ray_intersect(&ray) {
            Some(hit) => hit,
            None => break,
        };
        let wo = -ray.dir();

        if let Some(light) = scene.emitter_at(hit.tri) {
            // Glossy vertices already took their light through next-event
            // estimation.
            if hit.surf.entering && last_kind != BsdfKind::Glossy {
                color += throughput * light.emission(&wo, &hit.surf.uv).intensity;
            }
            break;
        }

        let bsdf = scene.bsdf(hit.material);
        match bsdf.kind() {
            BsdfKind::Specular => {
                let sample = bsdf.sample(rng, &hit.surf, &wo, false);
                if sample.color.is_black() {
                    break;
                }
                // pdf is one for the deterministic bounce.
                throughput *= sample.color;
                ray = Ray3f::new(hit.surf.point, sample.wi, Some(EPSILON), None);
                last_kind = BsdfKind::Specular;
            }
            BsdfKind::Glossy => {
                color += next_event(scene, bsdf, &hit.surf, &wo, rng) * throughput;

                let sample = bsdf.sample(rng, &hit.surf, &wo, false);
                if sample.pdf == 0.0 || sample.color.is_black() {
                    break;
                }
                throughput *= sample.color * (1.0 / sample.pdf);
                ray = Ray3f::new(hit.surf.point, sample.wi, Some(EPSILON), None);
                last_kind = BsdfKind::Glossy;
            }
            BsdfKind::Diffuse => {
                let r2 = radius * radius;
                let norm = 1.0 / photons.len().max(1) as Float;
                let mut gathered = RGBSpectrum::black();
                grid.for_each_in_radius(&hit.surf.point, |i| {
                    let photon = &photons[i as usize];
                    let d2 = (photon.pos - hit.surf.point).norm_squared();
                    // Epanechnikov kernel over the query disk.
                    let k = 2.0 * INV_PI / r2 * (1.0 - d2 / r2) * norm;
                    gathered +=
                        bsdf.eval(&photon.in_dir, &hit.surf, &wo) * photon.contrib * k;
                });
                color += throughput * gathered;
                break;
            }
        }
    }

    color
}

impl ProgressiveIntegrator for SppmIntegrator {
    fn render_iteration(&mut self, scene: &Scene, film: &mut Bitmap, iteration: u32) {
        let workers = self.threads.unwrap_or_else(default_workers);
        let (width, height) = (film.width(), film.height());

        let base_radius = match self.base_radius {
            Some(radius) => radius,
            None => {
                let radius = 2.0 * estimate_pixel_size(scene, width, height);
                log::info!("SPPM base radius: {}.", radius);
                self.base_radius = Some(radius);
                radius
            }
        };

        // One light path per pixel; the light and eye passes draw from
        // distinct seed streams of the same iteration.
        let photons = trace_light_paths(scene, width * height, workers, 2 * iteration);
        log::debug!("Iteration {}: {} photons.", iteration, photons.len());

        let radius = Self::query_radius(base_radius, iteration);
        let positions: Vec<Vector3f> = photons.iter().map(|p| p.pos).collect();
        let grid = HashGrid::build(&positions, radius);

        render_rows(scene, film, workers, 2 * iteration + 1, |scene, ray, rng| {
            eye_trace(scene, ray, rng, &photons, &grid, radius)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrators::testutil::{center_average, expected_center_radiance, lamp_over_floor};

    #[test]
    fn test_radius_schedule() {
        let base = 0.2;
        assert!((SppmIntegrator::query_radius(base, 1) - base).abs() < 1e-7);

        let mut prev = Float::MAX;
        for i in 1..100 {
            let r = SppmIntegrator::query_radius(base, i);
            assert!(r < prev);
            assert!(r > 0.0);
            prev = r;
        }

        // alpha = 0.75 gives an i^(-1/8) decay.
        let r16 = SppmIntegrator::query_radius(base, 16);
        assert!((r16 - base / (16.0 as Float).powf(0.125)).abs() < 1e-6);
    }

    #[test]
    fn test_sppm_matches_analytic_irradiance() {
        let scene = lamp_over_floor(32, 32);
        let mut film = Bitmap::new(32, 32);
        let mut integrator = SppmIntegrator::new();

        let iterations = 600;
        for i in 1..=iterations {
            integrator.render_iteration(&scene, &mut film, i);
        }

        let got = center_average(&film, iterations);
        let expected = expected_center_radiance();
        let err = (got - expected).abs() / expected;
        assert!(err < 0.15, "radiance {} vs analytic {}", got, expected);
    }

    #[test]
    fn test_sppm_thread_count_invariant() {
        let scene = lamp_over_floor(16, 16);

        let mut film_a = Bitmap::new(16, 16);
        let mut one = SppmIntegrator::with_threads(1);
        for i in 1..=2 {
            one.render_iteration(&scene, &mut film_a, i);
        }

        let mut film_b = Bitmap::new(16, 16);
        let mut four = SppmIntegrator::with_threads(4);
        for i in 1..=2 {
            four.render_iteration(&scene, &mut film_b, i);
        }

        // The photon list is identical for any worker count; only the
        // gather summation order inside a grid cell may differ, which
        // leaves differences at floating-point noise level.
        for (a, b) in film_a.data().iter().zip(film_b.data().iter()) {
            assert!((a - b).norm() < 1e-4);
        }
    }

    #[test]
    fn test_base_radius_fixed_after_first_iteration() {
        let scene = lamp_over_floor(16, 16);
        let mut film = Bitmap::new(16, 16);
        let mut integrator = SppmIntegrator::with_threads(1);

        assert!(integrator.base_radius.is_none());
        integrator.render_iteration(&scene, &mut film, 1);
        let base = integrator.base_radius;
        assert!(base.is_some());

        integrator.render_iteration(&scene, &mut film, 2);
        assert_eq!(base, integrator.base_radius);
    }
}
