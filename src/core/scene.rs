// Copyright @yucwang 2026

use crate::accel::bvh::Bvh;
use crate::core::bsdf::{Bsdf, BsdfKind};
use crate::core::emitter::Emitter;
use crate::core::interaction::{ShadingFrame, SurfaceParams};
use crate::core::rng::LcgRng;
use crate::core::sensor::Sensor;
use crate::emitters::triangle::TriangleLight;
use crate::math::constants::{Float, Vector2f, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Intersection between a scene ray and the triangle soup, resolved to the
/// triangle's material slot.
#[derive(Debug, Clone, Copy)]
pub struct SceneHit {
    pub t: Float,
    pub tri: u32,
    pub material: u32,
    pub surf: SurfaceParams,
}

struct MaterialSlot {
    bsdf: Box<dyn Bsdf>,
    radiance: Option<RGBSpectrum>,
}

/// Accumulates geometry, materials and lights, then bakes the acceleration
/// structures into an immutable [`Scene`]. Materials and emitters are
/// referenced by index everywhere; triangles carry their material slot in
/// the fourth index component.
pub struct SceneBuilder {
    vertices: Vec<Vector3f>,
    triangles: Vec<[u32; 4]>,
    materials: Vec<MaterialSlot>,
    emitters: Vec<Box<dyn Emitter>>,
    sensor: Box<dyn Sensor>,
}

impl SceneBuilder {
    pub fn new(sensor: Box<dyn Sensor>) -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            materials: Vec::new(),
            emitters: Vec::new(),
            sensor,
        }
    }

    pub fn add_material(&mut self, bsdf: Box<dyn Bsdf>) -> u32 {
        self.materials.push(MaterialSlot { bsdf, radiance: None });
        (self.materials.len() - 1) as u32
    }

    /// A material whose triangles emit `radiance` on their front face; an
    /// area light is created per emissive triangle when the scene is built.
    pub fn add_emissive_material(&mut self, bsdf: Box<dyn Bsdf>, radiance: RGBSpectrum) -> u32 {
        self.materials.push(MaterialSlot { bsdf, radiance: Some(radiance) });
        (self.materials.len() - 1) as u32
    }

    pub fn add_emitter(&mut self, emitter: Box<dyn Emitter>) {
        self.emitters.push(emitter);
    }

    pub fn add_vertex(&mut self, v: Vector3f) -> u32 {
        self.vertices.push(v);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32, material: u32) {
        debug_assert!((material as usize) < self.materials.len());
        self.triangles.push([i0, i1, i2, material]);
    }

    /// Two triangles spanning the quad `v0 v1 v2 v3`, in winding order.
    pub fn add_quad(&mut self, v0: Vector3f, v1: Vector3f, v2: Vector3f, v3: Vector3f,
                    material: u32) {
        let i0 = self.add_vertex(v0);
        let i1 = self.add_vertex(v1);
        let i2 = self.add_vertex(v2);
        let i3 = self.add_vertex(v3);
        self.add_triangle(i0, i1, i2, material);
        self.add_triangle(i0, i2, i3, material);
    }

    /// Builds the BVH, instantiates one area light per emissive triangle
    /// and freezes the scene.
    pub fn build(self) -> Scene {
        let SceneBuilder { vertices, triangles, materials, mut emitters, sensor } = self;

        assert!(!triangles.is_empty(), "scene has no geometry");

        let mut tri_emitter = vec![-1i32; triangles.len()];
        for (i, tri) in triangles.iter().enumerate() {
            if let Some(radiance) = materials[tri[3] as usize].radiance {
                tri_emitter[i] = emitters.len() as i32;
                emitters.push(Box::new(TriangleLight::new(
                    vertices[tri[0] as usize],
                    vertices[tri[1] as usize],
                    vertices[tri[2] as usize],
                    radiance,
                )));
            }
        }

        assert!(!emitters.is_empty(), "scene has no emitters");

        let bvh = Bvh::build(&vertices, &triangles);
        log::info!(
            "Scene: {} triangles, {} materials, {} emitters, {} BVH nodes.",
            triangles.len(),
            materials.len(),
            emitters.len(),
            bvh.node_count()
        );

        Scene { vertices, triangles, materials, emitters, tri_emitter, sensor, bvh }
    }
}

/// An immutable scene ready for rendering, shared across worker threads.
pub struct Scene {
    vertices: Vec<Vector3f>,
    triangles: Vec<[u32; 4]>,
    materials: Vec<MaterialSlot>,
    emitters: Vec<Box<dyn Emitter>>,
    /// Per-triangle emitter index, -1 for non-emissive triangles.
    tri_emitter: Vec<i32>,
    sensor: Box<dyn Sensor>,
    bvh: Bvh,
}

impl Scene {
    /// Closest intersection along the ray, with shading information.
    pub fn ray_intersect(&self, ray: &Ray3f) -> Option<SceneHit> {
        let hit = self.bvh.traverse(ray, false)?;

        let tri = self.triangles[hit.tri as usize];
        let v0 = self.vertices[tri[0] as usize];
        let v1 = self.vertices[tri[1] as usize];
        let v2 = self.vertices[tri[2] as usize];

        let n = (v1 - v0).cross(&(v2 - v0)).normalize();
        let entering = ray.dir().dot(&n) < 0.0;
        let face_normal = if entering { n } else { -n };

        Some(SceneHit {
            t: hit.t,
            tri: hit.tri as u32,
            material: tri[3],
            surf: SurfaceParams {
                entering,
                point: ray.at(hit.t),
                uv: Vector2f::new(hit.u, hit.v),
                face_normal,
                frame: ShadingFrame::from_normal(&face_normal),
            },
        })
    }

    /// True when anything blocks the open segment between the two points.
    pub fn occluded(&self, from: &Vector3f, to: &Vector3f) -> bool {
        let d = to - from;
        let dist = d.norm();
        if dist <= 2.0 * EPSILON {
            return false;
        }
        let ray = Ray3f::new(*from, d, Some(EPSILON), Some(dist - EPSILON));
        self.bvh.traverse(&ray, true).is_some()
    }

    pub fn bsdf(&self, material: u32) -> &dyn Bsdf {
        self.materials[material as usize].bsdf.as_ref()
    }

    pub fn bsdf_kind(&self, material: u32) -> BsdfKind {
        self.materials[material as usize].bsdf.kind()
    }

    /// The area light a triangle belongs to, if it is emissive.
    pub fn emitter_at(&self, tri: u32) -> Option<&dyn Emitter> {
        let e = self.tri_emitter[tri as usize];
        if e >= 0 {
            Some(self.emitters[e as usize].as_ref())
        } else {
            None
        }
    }

    /// Picks an emitter uniformly; the returned pdf is the discrete
    /// selection probability.
    pub fn sample_emitter(&self, rng: &mut LcgRng) -> (&dyn Emitter, Float) {
        let count = self.emitters.len();
        let i = ((rng.next_f32() * count as Float) as usize).min(count - 1);
        (self.emitters[i].as_ref(), 1.0 / count as Float)
    }

    /// Probability of picking any single emitter in [`Self::sample_emitter`].
    pub fn emitter_pdf(&self) -> Float {
        1.0 / self.emitters.len() as Float
    }

    pub fn emitters(&self) -> &[Box<dyn Emitter>] {
        &self.emitters
    }

    pub fn sensor(&self) -> &dyn Sensor {
        self.sensor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::diffuse::Diffuse;
    use crate::sensors::perspective::PerspectiveSensor;

    fn test_sensor() -> Box<dyn Sensor> {
        Box::new(PerspectiveSensor::new(
            Vector3f::new(0.0, -3.0, 0.0),
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            60.0,
            16,
            16,
        ))
    }

    fn two_plane_scene() -> Scene {
        let mut builder = SceneBuilder::new(test_sensor());
        let gray = builder.add_material(Box::new(Diffuse::new(RGBSpectrum::splat(0.5))));
        let lamp = builder.add_emissive_material(
            Box::new(Diffuse::new(RGBSpectrum::black())),
            RGBSpectrum::splat(1.0),
        );
        // Floor at z = 0, light square at z = 1.
        builder.add_quad(
            Vector3f::new(-2.0, -2.0, 0.0),
            Vector3f::new(2.0, -2.0, 0.0),
            Vector3f::new(2.0, 2.0, 0.0),
            Vector3f::new(-2.0, 2.0, 0.0),
            gray,
        );
        builder.add_quad(
            Vector3f::new(-0.5, -0.5, 1.0),
            Vector3f::new(0.5, -0.5, 1.0),
            Vector3f::new(0.5, 0.5, 1.0),
            Vector3f::new(-0.5, 0.5, 1.0),
            lamp,
        );
        builder.build()
    }

    #[test]
    fn test_scene_intersect_orients_normal() {
        let scene = two_plane_scene();

        let from_above = Ray3f::new(Vector3f::new(1.0, 1.0, 3.0),
                                    Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.ray_intersect(&from_above).expect("floor hit");
        assert!(hit.surf.face_normal.z > 0.9);
        assert!((hit.t - 3.0).abs() < 1e-3);

        let from_below = Ray3f::new(Vector3f::new(1.0, 1.0, -3.0),
                                    Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = scene.ray_intersect(&from_below).expect("floor hit");
        assert!(hit.surf.face_normal.z < -0.9);
    }

    #[test]
    fn test_scene_emitter_lookup() {
        let scene = two_plane_scene();

        // One area light per emissive triangle.
        assert_eq!(scene.emitters().len(), 2);

        let into_lamp = Ray3f::new(Vector3f::new(0.0, 0.0, 3.0),
                                   Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.ray_intersect(&into_lamp).expect("lamp hit");
        assert!(scene.emitter_at(hit.tri).is_some());

        let off_lamp = Ray3f::new(Vector3f::new(1.5, 1.5, 3.0),
                                  Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = scene.ray_intersect(&off_lamp).expect("floor hit");
        assert!(scene.emitter_at(hit.tri).is_none());
    }

    #[test]
    fn test_scene_occlusion() {
        let scene = two_plane_scene();

        // The lamp blocks the segment through it, not one beside it.
        let below = Vector3f::new(0.0, 0.0, 0.5);
        let above = Vector3f::new(0.0, 0.0, 1.5);
        assert!(scene.occluded(&below, &above));
        assert!(!scene.occluded(&Vector3f::new(1.5, 0.0, 0.5), &Vector3f::new(1.5, 0.0, 1.5)));

        // Endpoints on surfaces do not self-occlude.
        assert!(!scene.occluded(&Vector3f::new(0.0, 0.0, 0.0), &Vector3f::new(0.0, 0.0, 0.999)));
    }
}
