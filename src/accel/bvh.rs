// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::thread;

/// Cost of one traversal step in the SAH model, in units of one
/// ray-triangle test.
const TRAVERSAL_COST: Float = 1.0;

/// Subtrees larger than this get their own build task.
const PARALLEL_THRESHOLD: usize = 1000;

/// SAH construction keeps the depth close to log2(N), so a fixed stack is
/// enough; overflowing it is a builder invariant violation, not a runtime
/// condition.
const TRAVERSAL_STACK_SIZE: usize = 64;

/// Ray-triangle hit information.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Triangle index in the original input order.
    pub tri: i32,
    pub t: Float,
    /// First barycentric coordinate.
    pub u: Float,
    /// Second barycentric coordinate.
    pub v: Float,
}

/// Triangle in precomputed edge/normal form for the Moeller-Trumbore test.
/// Stored in BVH primitive order for traversal locality.
#[derive(Debug, Clone, Copy)]
pub struct PrecomputedTri {
    pub v0: Vector3f,
    pub e1: Vector3f,
    pub e2: Vector3f,
    pub n: Vector3f,
}

impl PrecomputedTri {
    pub fn new(v0: Vector3f, v1: Vector3f, v2: Vector3f) -> Self {
        let e1 = v0 - v1;
        let e2 = v2 - v0;
        let n = e1.cross(&e2);
        Self { v0, e1, e2, n }
    }
}

fn prodsign(x: Float, y: Float) -> Float {
    Float::from_bits(x.to_bits() ^ (y.to_bits() & 0x8000_0000))
}

/// Intersects a ray with a precomputed triangle. Returns (t, u, v) when the
/// intersection lies in [ray.min_t, t_max). Degenerate triangles and
/// parallel rays fall through to a miss.
pub fn intersect_ray_tri(ray: &Ray3f, tri: &PrecomputedTri, t_max: Float)
    -> Option<(Float, Float, Float)> {
    const EPS: Float = 1e-9;

    let c = tri.v0 - ray.origin();
    let r = ray.dir().cross(&c);
    let det = tri.n.dot(&ray.dir());
    let abs_det = det.abs();

    let u = prodsign(r.dot(&tri.e2), det);
    let v = prodsign(r.dot(&tri.e1), det);
    let w = abs_det - u - v;

    if u >= -EPS && v >= -EPS && w >= -EPS {
        let t = prodsign(tri.n.dot(&c), det);
        if t >= abs_det * ray.min_t && abs_det * t_max > t {
            let inv_det = 1.0 / abs_det;
            return Some((t * inv_det, u * inv_det, v * inv_det));
        }
    }

    None
}

/// One BVH node. Leaves have `count_or_axis > 0` and index the remapped
/// primitive range; inner nodes store the negated split axis and the index
/// of the first of two adjacent children.
#[derive(Debug, Clone, Copy)]
struct Node {
    min: Vector3f,
    max: Vector3f,
    prim_or_child: i32,
    count_or_axis: i32,
}

impl Node {
    fn empty() -> Self {
        Self {
            min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
            max: Vector3f::new(-FLOAT_MAX, -FLOAT_MAX, -FLOAT_MAX),
            prim_or_child: 0,
            count_or_axis: 0,
        }
    }

    fn leaf(bounds: &AABB, first: usize, count: usize) -> Self {
        Self {
            min: bounds.p_min,
            max: bounds.p_max,
            prim_or_child: first as i32,
            count_or_axis: count as i32,
        }
    }

    fn is_leaf(&self) -> bool {
        self.count_or_axis > 0
    }

    fn bounds(&self) -> AABB {
        AABB { p_min: self.min, p_max: self.max }
    }
}

/// Bounding volume hierarchy over a triangle soup. Built once when the
/// scene is finalized, immutable afterwards; traversal never locks.
pub struct Bvh {
    nodes: Vec<Node>,
    prim_ids: Vec<u32>,
    tris: Vec<PrecomputedTri>,
}

/// Raw handle to the preallocated node array, shared between build tasks.
/// Slots are disjoint: a slot is written only by the task that reserved it
/// through the atomic node counter, or by the parent before the subtree is
/// handed off.
#[derive(Clone, Copy)]
struct NodeTable(*mut Node);

unsafe impl Send for NodeTable {}
unsafe impl Sync for NodeTable {}

struct Scratch {
    costs: Vec<Float>,
    tmp: Vec<u32>,
}

impl Scratch {
    fn new(count: usize) -> Self {
        Self { costs: vec![0.0; count], tmp: vec![0; count] }
    }
}

#[derive(Clone, Copy)]
struct Builder<'a> {
    bboxes: &'a [AABB],
    flags: &'a [AtomicU8],
    nodes: NodeTable,
    node_count: &'a AtomicUsize,
}

struct ChildTask<'b> {
    node_id: usize,
    first: usize,
    axes: [&'b mut [u32]; 3],
}

/// Full sweep over one axis-sorted range: accumulate prefix costs from the
/// left, then sweep from the right to find the minimum-cost split. Returns
/// the split position, the right child's box and the cost.
fn find_split(prims: &[u32], costs: &mut [Float], bboxes: &[AABB]) -> (usize, AABB, Float) {
    let n = prims.len();

    let mut cur = AABB::default();
    for i in 0..(n - 1) {
        cur.expand_by_aabb(&bboxes[prims[i] as usize]);
        costs[i] = (i + 1) as Float * cur.half_area();
    }

    let mut min_cost = FLOAT_MAX;
    let mut min_split = 0;
    let mut min_bb = AABB::default();

    cur = AABB::default();
    for i in (1..n).rev() {
        cur.expand_by_aabb(&bboxes[prims[i] as usize]);
        let c = costs[i - 1] + (n - i) as Float * cur.half_area();
        if c < min_cost {
            min_bb = cur;
            min_cost = c;
            min_split = i;
        }
    }

    (min_split, min_bb, min_cost)
}

impl<'a> Builder<'a> {
    fn write_node(&self, id: usize, node: Node) {
        unsafe {
            self.nodes.0.add(id).write(node);
        }
    }

    fn read_node(&self, id: usize) -> Node {
        unsafe { *self.nodes.0.add(id) }
    }

    /// Recursively splits the range covered by `node_id`. The three slices
    /// hold the same primitive set, each sorted by centroid on one axis;
    /// `first` is the absolute offset of the range in the remap array.
    fn build_range(
        &self,
        node_id: usize,
        first: usize,
        mut axes: [&mut [u32]; 3],
        scratch: &mut Scratch,
    ) {
        let count = axes[0].len();
        if count <= 1 {
            return;
        }

        let node = self.read_node(node_id);

        // Try a full-sweep SAH split on all three axes.
        let mut min_cost = FLOAT_MAX;
        let mut min_axis = 0usize;
        let mut min_split = 0usize;
        let mut min_right = AABB::default();
        for axis in 0..3 {
            let (split, right_bb, cost) =
                find_split(&axes[axis], &mut scratch.costs[..count], self.bboxes);
            if cost < min_cost {
                min_right = right_bb;
                min_cost = cost;
                min_split = split;
                min_axis = axis;
            }
        }
        debug_assert!(min_split > 0 && min_split < count);

        // Compare against the cost of keeping this node a leaf.
        let leaf_cost = (count as Float - TRAVERSAL_COST) * node.bounds().half_area();
        if min_cost >= leaf_cost {
            return;
        }

        // Flag the primitives of the winning axis as left/right, then
        // stably re-partition the other two sorted arrays by those flags.
        // This keeps all three arrays sorted without re-sorting, O(n).
        for &p in &axes[min_axis][..min_split] {
            self.flags[p as usize].store(0, Ordering::Relaxed);
        }
        for &p in &axes[min_axis][min_split..] {
            self.flags[p as usize].store(1, Ordering::Relaxed);
        }
        for other in 0..3 {
            if other == min_axis {
                continue;
            }
            let mut left = 0;
            let mut right = min_split;
            for &p in axes[other].iter() {
                if self.flags[p as usize].load(Ordering::Relaxed) != 0 {
                    scratch.tmp[right] = p;
                    right += 1;
                } else {
                    scratch.tmp[left] = p;
                    left += 1;
                }
            }
            axes[other].copy_from_slice(&scratch.tmp[..count]);
        }

        // The right child's box fell out of the sweep; the left one is
        // recomputed bottom-up.
        let mut min_left = AABB::default();
        for &p in &axes[min_axis][..min_split] {
            min_left.expand_by_aabb(&self.bboxes[p as usize]);
        }

        // Reserve two adjacent slots and turn this node into an inner node.
        let child = self.node_count.fetch_add(2, Ordering::Relaxed);
        self.write_node(node_id, Node {
            min: node.min,
            max: node.max,
            prim_or_child: child as i32,
            count_or_axis: -(min_axis as i32),
        });
        self.write_node(child, Node::leaf(&min_left, first, min_split));
        self.write_node(child + 1, Node::leaf(&min_right, first + min_split, count - min_split));

        let [a0, a1, a2] = axes;
        let (l0, r0) = a0.split_at_mut(min_split);
        let (l1, r1) = a1.split_at_mut(min_split);
        let (l2, r2) = a2.split_at_mut(min_split);
        let left_task = ChildTask { node_id: child, first, axes: [l0, l1, l2] };
        let right_task = ChildTask {
            node_id: child + 1,
            first: first + min_split,
            axes: [r0, r1, r2],
        };

        let (small, big) = if min_split < count - min_split {
            (left_task, right_task)
        } else {
            (right_task, left_task)
        };

        // Fork off the smaller child when it is worth a task; the join is
        // the end of the scope. Spawning only the smaller side bounds the
        // number of forks near the root.
        let small_count = small.axes[0].len();
        if small_count > PARALLEL_THRESHOLD {
            let builder = *self;
            thread::scope(|s| {
                s.spawn(move || {
                    let mut small_scratch = Scratch::new(small_count);
                    builder.build_range(small.node_id, small.first, small.axes, &mut small_scratch);
                });
                self.build_range(big.node_id, big.first, big.axes, scratch);
            });
        } else {
            self.build_range(big.node_id, big.first, big.axes, scratch);
            self.build_range(small.node_id, small.first, small.axes, scratch);
        }
    }
}

impl Bvh {
    /// Builds a BVH from a vertex buffer and one [i0, i1, i2, material]
    /// tuple per triangle. Building on an empty triangle list is a caller
    /// error.
    pub fn build(verts: &[Vector3f], indices: &[[u32; 4]]) -> Self {
        let num_tris = indices.len();
        assert!(num_tris > 0, "BVH requires a non-empty triangle list");

        let mut bboxes = Vec::with_capacity(num_tris);
        let mut centers = Vec::with_capacity(num_tris);
        let mut root_bb = AABB::default();
        for tri in indices {
            let v0 = verts[tri[0] as usize];
            let v1 = verts[tri[1] as usize];
            let v2 = verts[tri[2] as usize];

            let mut bb = AABB::default();
            bb.expand_by_point(&v0);
            bb.expand_by_point(&v1);
            bb.expand_by_point(&v2);
            root_bb.expand_by_aabb(&bb);

            centers.push((v0 + v1 + v2) * (1.0 / 3.0));
            bboxes.push(bb);
        }

        // One index array per axis, each sorted by centroid projection.
        let mut prims_x: Vec<u32> = (0..num_tris as u32).collect();
        let mut prims_y = prims_x.clone();
        let mut prims_z = prims_x.clone();
        {
            let by_axis = |axis: usize| {
                let centers = &centers;
                move |a: &u32, b: &u32| {
                    centers[*a as usize][axis].total_cmp(&centers[*b as usize][axis])
                }
            };
            thread::scope(|s| {
                s.spawn(|| prims_x.sort_unstable_by(by_axis(0)));
                s.spawn(|| prims_y.sort_unstable_by(by_axis(1)));
                prims_z.sort_unstable_by(by_axis(2));
            });
        }

        let mut nodes = vec![Node::empty(); 2 * num_tris + 1];
        nodes[0] = Node::leaf(&root_bb, 0, num_tris);
        let node_count = AtomicUsize::new(1);
        let flags: Vec<AtomicU8> = (0..num_tris).map(|_| AtomicU8::new(0)).collect();

        {
            let builder = Builder {
                bboxes: &bboxes,
                flags: &flags,
                nodes: NodeTable(nodes.as_mut_ptr()),
                node_count: &node_count,
            };
            let mut scratch = Scratch::new(num_tris);
            builder.build_range(
                0,
                0,
                [&mut prims_x[..], &mut prims_y[..], &mut prims_z[..]],
                &mut scratch,
            );
        }

        let num_nodes = node_count.into_inner();
        nodes.truncate(num_nodes);

        // Rebuild the triangle cache in remapped order; the x-axis array is
        // the final permutation the leaves index into.
        let prim_ids = prims_x;
        let tris = prim_ids
            .iter()
            .map(|&tri_id| {
                let tri = indices[tri_id as usize];
                PrecomputedTri::new(
                    verts[tri[0] as usize],
                    verts[tri[1] as usize],
                    verts[tri[2] as usize],
                )
            })
            .collect();

        log::debug!("BVH built: {} triangles, {} nodes", num_tris, num_nodes);

        Self { nodes, prim_ids, tris }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Traverses the BVH for the closest intersection, or the first one
    /// found if `any` is set. Returns None on a miss.
    pub fn traverse(&self, ray: &Ray3f, any: bool) -> Option<Hit> {
        let mut hit = Hit { tri: -1, t: ray.max_t, u: 0.0, v: 0.0 };

        let root = self.nodes[0];
        if root.is_leaf() {
            self.intersect_leaf(&root, ray, any, &mut hit);
            return self.finish(hit);
        }

        let org = ray.origin();
        let dir = ray.dir();
        let idir = Vector3f::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z);

        let mut stack = [0i32; TRAVERSAL_STACK_SIZE];
        let mut sp: usize = 0;
        stack[0] = -1;
        let mut top = root.prim_or_child;

        while top >= 0 {
            // The two children always sit in adjacent slots; test both
            // slabs together before deciding what to do with either.
            let left = self.nodes[top as usize];
            let right = self.nodes[top as usize + 1];
            let (tl0, tl1) = slab_test(&left, &org, &idir, ray.min_t, hit.t);
            let (tr0, tr1) = slab_test(&right, &org, &idir, ray.min_t, hit.t);

            let old_sp = sp;

            if tl0 <= tl1 {
                if left.is_leaf() {
                    if self.intersect_leaf(&left, ray, any, &mut hit) && any {
                        return self.finish(hit);
                    }
                } else {
                    sp += 1;
                    debug_assert!(sp < TRAVERSAL_STACK_SIZE, "BVH traversal stack overflow");
                    stack[sp] = left.prim_or_child;
                }
            }

            if tr0 <= tr1 {
                if right.is_leaf() {
                    if self.intersect_leaf(&right, ray, any, &mut hit) && any {
                        return self.finish(hit);
                    }
                } else {
                    sp += 1;
                    debug_assert!(sp < TRAVERSAL_STACK_SIZE, "BVH traversal stack overflow");
                    stack[sp] = right.prim_or_child;
                }
            }

            // If both children were pushed, visit the nearer box first.
            if sp >= old_sp + 2 && tl0 < tr0 {
                stack.swap(sp, sp - 1);
            }

            top = stack[sp];
            sp = sp.saturating_sub(1);
        }

        self.finish(hit)
    }

    fn intersect_leaf(&self, leaf: &Node, ray: &Ray3f, any: bool, hit: &mut Hit) -> bool {
        let first = leaf.prim_or_child as usize;
        let count = leaf.count_or_axis as usize;
        let mut found = false;
        for j in first..(first + count) {
            if let Some((t, u, v)) = intersect_ray_tri(ray, &self.tris[j], hit.t) {
                hit.tri = j as i32;
                hit.t = t;
                hit.u = u;
                hit.v = v;
                found = true;
                if any {
                    return true;
                }
            }
        }
        found
    }

    /// Translates the internal triangle index back to the original id.
    fn finish(&self, mut hit: Hit) -> Option<Hit> {
        if hit.tri >= 0 {
            hit.tri = self.prim_ids[hit.tri as usize] as i32;
            Some(hit)
        } else {
            None
        }
    }
}

fn slab_test(node: &Node, org: &Vector3f, idir: &Vector3f, t_min: Float, t_max: Float)
    -> (Float, Float) {
    let mut t0 = t_min;
    let mut t1 = t_max;
    for a in 0..3 {
        let lo = (node.min[a] - org[a]) * idir[a];
        let hi = (node.max[a] - org[a]) * idir[a];
        let (near, far) = if idir[a] < 0.0 { (hi, lo) } else { (lo, hi) };
        // f32::max/min skip NaNs from 0 * inf, which keeps the test
        // conservative for rays parallel to a slab.
        t0 = t0.max(near);
        t1 = t1.min(far);
    }
    (t0, t1)
}

/* Tests for the BVH */
