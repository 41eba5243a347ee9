// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };
use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

/// 2D accumulation target. Progressive integrators add one iteration worth
/// of radiance per pixel per call; consumers divide by the iteration count.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<Vector3f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector3f;

    fn index(&self, index: (usize, usize)) -> &Vector3f {
        let transformed_index = index.0 + self.width * index.1;
        &self.data[transformed_index]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector3f {
        let transformed_index = index.0 + self.width * index.1;
        &mut self.data[transformed_index]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(Vector3f::new(0.0, 0.0, 0.0);
                          pixel_number),
               width,
               height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn accumulate(&mut self, x: usize, y: usize, value: RGBSpectrum) {
        self.data[x + self.width * y] += value.to_vector3();
    }

    pub fn accumulate_row(&mut self, y: usize, row: &[RGBSpectrum]) {
        debug_assert_eq!(row.len(), self.width);
        for (x, value) in row.iter().enumerate() {
            self.data[x + self.width * y] += value.to_vector3();
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.data.iter_mut() {
            *pixel = Vector3f::new(0.0, 0.0, 0.0);
        }
    }

    pub fn data(&self) -> &[Vector3f] {
        &self.data
    }

    /// Copies the pixels out as flat tuples, scaled by `scale`. Used to hand
    /// the accumulated image to the EXR writer after `n` iterations.
    pub fn raw_copy(&self, scale: Float) -> Vec<(Float, Float, Float)> {
        self.data
            .iter()
            .map(|p| (p.x * scale, p.y * scale, p.z * scale))
            .collect()
    }
}

/* Test for Bitmap */
