// Copyright @yucwang 2026

pub mod bvh;
pub mod hash_grid;
