// Copyright @yucwang 2026

use tuile::core::integrator::ProgressiveIntegrator;
use tuile::core::scene::{Scene, SceneBuilder};
use tuile::integrators::path::PathTracer;
use tuile::integrators::sppm::SppmIntegrator;
use tuile::io::exr_utils::write_exr_to_file;
use tuile::materials::diffuse::Diffuse;
use tuile::materials::mirror::Mirror;
use tuile::materials::phong::GlossyPhong;
use tuile::math::bitmap::Bitmap;
use tuile::math::constants::{Float, Vector3f};
use tuile::math::spectrum::RGBSpectrum;
use tuile::sensors::perspective::PerspectiveSensor;

use indicatif::ProgressBar;

use std::time::Instant;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Algorithm {
    Sppm,
    Path,
}

struct Options {
    width: usize,
    height: usize,
    iterations: u32,
    algorithm: Algorithm,
    threads: Option<usize>,
    output: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            iterations: 64,
            algorithm: Algorithm::Sppm,
            threads: None,
            output: String::from("render.exr"),
        }
    }
}

fn print_usage() {
    println!("Usage: tuile [options]");
    println!("  --width <n>         image width in pixels (default 512)");
    println!("  --height <n>        image height in pixels (default 512)");
    println!("  --iterations <n>    progressive iterations (default 64)");
    println!("  --integrator <name> sppm or pt (default sppm)");
    println!("  --threads <n>       worker threads (default: all cores)");
    println!("  --output <path>     output EXR file (default render.exr)");
}

fn parse_options() -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);

    fn value<T: std::str::FromStr>(args: &mut impl Iterator<Item = String>, flag: &str)
        -> Result<T, String> {
        args.next()
            .ok_or_else(|| format!("missing value for {}", flag))?
            .parse()
            .map_err(|_| format!("invalid value for {}", flag))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--width" => options.width = value(&mut args, "--width")?,
            "--height" => options.height = value(&mut args, "--height")?,
            "--iterations" => options.iterations = value(&mut args, "--iterations")?,
            "--threads" => options.threads = Some(value(&mut args, "--threads")?),
            "--output" => options.output = value(&mut args, "--output")?,
            "--integrator" => {
                let name: String = value(&mut args, "--integrator")?;
                options.algorithm = match name.as_str() {
                    "sppm" => Algorithm::Sppm,
                    "pt" => Algorithm::Path,
                    _ => return Err(format!("unknown integrator: {}", name)),
                };
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(format!("unknown option: {}", arg)),
        }
    }

    if options.width == 0 || options.height == 0 || options.iterations == 0 {
        return Err(String::from("width, height and iterations must be positive"));
    }
    Ok(options)
}

/// Six outward-wound quads forming an axis-aligned box.
fn add_box(builder: &mut SceneBuilder, lo: Vector3f, hi: Vector3f, material: u32) {
    let v = |x: Float, y: Float, z: Float| Vector3f::new(x, y, z);
    // Bottom and top.
    builder.add_quad(v(lo.x, lo.y, lo.z), v(hi.x, lo.y, lo.z),
                     v(hi.x, hi.y, lo.z), v(lo.x, hi.y, lo.z), material);
    builder.add_quad(v(lo.x, lo.y, hi.z), v(lo.x, hi.y, hi.z),
                     v(hi.x, hi.y, hi.z), v(hi.x, lo.y, hi.z), material);
    // Front and back.
    builder.add_quad(v(lo.x, lo.y, lo.z), v(lo.x, lo.y, hi.z),
                     v(hi.x, lo.y, hi.z), v(hi.x, lo.y, lo.z), material);
    builder.add_quad(v(lo.x, hi.y, lo.z), v(hi.x, hi.y, lo.z),
                     v(hi.x, hi.y, hi.z), v(lo.x, hi.y, hi.z), material);
    // Left and right.
    builder.add_quad(v(lo.x, lo.y, lo.z), v(lo.x, hi.y, lo.z),
                     v(lo.x, hi.y, hi.z), v(lo.x, lo.y, hi.z), material);
    builder.add_quad(v(hi.x, lo.y, lo.z), v(hi.x, lo.y, hi.z),
                     v(hi.x, hi.y, hi.z), v(hi.x, hi.y, lo.z), material);
}

/// Cornell box with a mirror block and a glossy block.
fn cornell_box(width: usize, height: usize) -> Scene {
    let sensor = PerspectiveSensor::new(
        Vector3f::new(0.0, -3.5, 1.0),
        Vector3f::new(0.0, 0.0, 1.0),
        Vector3f::new(0.0, 0.0, 1.0),
        40.0,
        width,
        height,
    );
    let mut builder = SceneBuilder::new(Box::new(sensor));

    let white = builder.add_material(Box::new(Diffuse::new(RGBSpectrum::splat(0.75))));
    let red = builder.add_material(Box::new(Diffuse::new(RGBSpectrum::new(0.63, 0.065, 0.05))));
    let green = builder.add_material(Box::new(Diffuse::new(RGBSpectrum::new(0.14, 0.45, 0.09))));
    let mirror = builder.add_material(Box::new(Mirror));
    let glossy = builder.add_material(Box::new(GlossyPhong::new(RGBSpectrum::splat(0.3), 32.0)));
    let lamp = builder.add_emissive_material(
        Box::new(Diffuse::new(RGBSpectrum::black())),
        RGBSpectrum::splat(20.0),
    );

    let v = Vector3f::new;

    // Floor, ceiling and back wall.
    builder.add_quad(v(-1.0, -1.0, 0.0), v(1.0, -1.0, 0.0),
                     v(1.0, 1.0, 0.0), v(-1.0, 1.0, 0.0), white);
    builder.add_quad(v(-1.0, -1.0, 2.0), v(-1.0, 1.0, 2.0),
                     v(1.0, 1.0, 2.0), v(1.0, -1.0, 2.0), white);
    builder.add_quad(v(-1.0, 1.0, 0.0), v(1.0, 1.0, 0.0),
                     v(1.0, 1.0, 2.0), v(-1.0, 1.0, 2.0), white);
    // Colored side walls.
    builder.add_quad(v(-1.0, -1.0, 0.0), v(-1.0, 1.0, 0.0),
                     v(-1.0, 1.0, 2.0), v(-1.0, -1.0, 2.0), red);
    builder.add_quad(v(1.0, -1.0, 0.0), v(1.0, -1.0, 2.0),
                     v(1.0, 1.0, 2.0), v(1.0, 1.0, 0.0), green);

    // Ceiling lamp, wound to emit downwards.
    builder.add_quad(v(-0.25, -0.25, 1.98), v(-0.25, 0.25, 1.98),
                     v(0.25, 0.25, 1.98), v(0.25, -0.25, 1.98), lamp);

    add_box(&mut builder, v(-0.65, 0.1, 0.0), v(-0.05, 0.7, 1.2), mirror);
    add_box(&mut builder, v(0.15, -0.45, 0.0), v(0.75, 0.15, 0.6), glossy);

    builder.build()
}

fn main() {
    env_logger::init();

    let options = match parse_options() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}.", message);
            print_usage();
            std::process::exit(1);
        }
    };

    let scene = cornell_box(options.width, options.height);
    let mut film = Bitmap::new(options.width, options.height);

    let mut integrator: Box<dyn ProgressiveIntegrator> = match (options.algorithm,
                                                                options.threads) {
        (Algorithm::Sppm, Some(threads)) => Box::new(SppmIntegrator::with_threads(threads)),
        (Algorithm::Sppm, None) => Box::new(SppmIntegrator::new()),
        (Algorithm::Path, Some(threads)) => Box::new(PathTracer::with_threads(threads)),
        (Algorithm::Path, None) => Box::new(PathTracer::new()),
    };

    log::info!(
        "Rendering {}x{} with {} for {} iterations.",
        options.width,
        options.height,
        match options.algorithm {
            Algorithm::Sppm => "SPPM",
            Algorithm::Path => "path tracing",
        },
        options.iterations
    );

    let start = Instant::now();
    let progress = ProgressBar::new(options.iterations as u64);
    for iteration in 1..=options.iterations {
        integrator.render_iteration(&scene, &mut film, iteration);
        progress.inc(1);
    }
    progress.finish_and_clear();
    log::info!("Rendering done in {:.2}s.", start.elapsed().as_secs_f64());

    write_exr_to_file(&film, 1.0 / options.iterations as Float, &options.output);
}
