// Copyright @yucwang 2026

pub mod point;
pub mod triangle;
