// Copyright @yucwang 2026

use crate::core::rng::{bernstein_hash, bernstein_init};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

/// Uniform spatial hash over a point set, used for fixed-radius
/// neighborhood queries. Cells are twice the query radius wide so that a
/// query only ever touches the 8 cells around the point. Rebuilt from
/// scratch whenever the point set or the radius changes.
pub struct HashGrid {
    bbox: AABB,
    positions: Vec<Vector3f>,
    inv_size: Float,
    radius_sq: Float,
    mask: u32,
    /// Inclusive prefix sums of bucket populations; bucket `h` covers
    /// `indices[ends[h - 1]..ends[h]]`.
    ends: Vec<u32>,
    indices: Vec<u32>,
}

fn hash_cell(x: i32, y: i32, z: i32, mask: u32) -> u32 {
    let mut h = bernstein_init();
    h = bernstein_hash(h, x as u32);
    h = bernstein_hash(h, y as u32);
    h = bernstein_hash(h, z as u32);
    h & mask
}

impl HashGrid {
    /// Builds the grid over `positions` for queries of radius `radius`.
    /// Histogram and scatter run over chunks on scoped worker threads.
    pub fn build(positions: &[Vector3f], radius: Float) -> Self {
        assert!(radius > 0.0, "hash grid radius must be positive");

        let count = positions.len();
        if count == 0 {
            return Self {
                bbox: AABB::default(),
                positions: Vec::new(),
                inv_size: 0.0,
                radius_sq: radius * radius,
                mask: 0,
                ends: vec![0],
                indices: Vec::new(),
            };
        }

        let mut bbox = AABB::default();
        for p in positions {
            bbox.expand_by_point(p);
        }
        // Slightly dilated so points on the boundary always land inside.
        bbox.dilate(0.001);

        let inv_size = 0.5 / radius;
        let table_size = (2 * count).next_power_of_two();
        let mask = (table_size - 1) as u32;

        let cell_of = |p: &Vector3f| -> u32 {
            let rel = (p - bbox.p_min) * inv_size;
            hash_cell(rel.x as i32, rel.y as i32, rel.z as i32, mask)
        };

        let workers = thread::available_parallelism().map_or(1, |n| n.get()).min(count);
        let chunk = (count + workers - 1) / workers;

        // Histogram of bucket populations.
        let counts: Vec<AtomicU32> = (0..table_size).map(|_| AtomicU32::new(0)).collect();
        thread::scope(|s| {
            for points in positions.chunks(chunk) {
                let counts = &counts;
                let cell_of = &cell_of;
                s.spawn(move || {
                    for p in points {
                        counts[cell_of(p) as usize].fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        // Inclusive prefix sum gives each bucket the end of its range; the
        // counts array then doubles as per-bucket write cursors that are
        // decremented during the scatter.
        let mut ends = Vec::with_capacity(table_size);
        let mut sum = 0u32;
        for c in &counts {
            sum += c.load(Ordering::Relaxed);
            ends.push(sum);
            c.store(sum, Ordering::Relaxed);
        }

        let indices: Vec<AtomicU32> = (0..count).map(|_| AtomicU32::new(0)).collect();
        thread::scope(|s| {
            for (chunk_id, points) in positions.chunks(chunk).enumerate() {
                let counts = &counts;
                let indices = &indices;
                let cell_of = &cell_of;
                s.spawn(move || {
                    let base = (chunk_id * chunk) as u32;
                    for (i, p) in points.iter().enumerate() {
                        let slot = counts[cell_of(p) as usize].fetch_sub(1, Ordering::Relaxed);
                        indices[slot as usize - 1].store(base + i as u32, Ordering::Relaxed);
                    }
                });
            }
        });
        let indices = indices.into_iter().map(AtomicU32::into_inner).collect();

        Self {
            bbox,
            positions: positions.to_vec(),
            inv_size,
            radius_sq: radius * radius,
            mask,
            ends,
            indices,
        }
    }

    /// Calls `visit` with the index of every stored point within the query
    /// radius of `p`. Points outside the grid bounds have no neighbors.
    pub fn for_each_in_radius<F: FnMut(u32)>(&self, p: &Vector3f, mut visit: F) {
        if !self.bbox.contains(p) {
            return;
        }

        // Per axis, the second candidate cell is the one the point leans
        // towards; together they cover the whole query sphere.
        let rel = (p - self.bbox.p_min) * self.inv_size;
        let mut cells = [[0i32; 2]; 3];
        for a in 0..3 {
            let c = rel[a] as i32;
            let frac = rel[a] - c as Float;
            cells[a] = [c, if frac > 0.5 { c + 1 } else { c - 1 }];
        }

        for &x in &cells[0] {
            for &y in &cells[1] {
                for &z in &cells[2] {
                    let h = hash_cell(x, y, z, self.mask) as usize;
                    let start = if h > 0 { self.ends[h - 1] } else { 0 };
                    let bucket = &self.indices[start as usize..self.ends[h] as usize];
                    for &i in bucket {
                        let d = self.positions[i as usize] - p;
                        if d.norm_squared() <= self.radius_sq {
                            visit(i);
                        }
                    }
                }
            }
        }
    }
}

/* Tests for the hash grid */
