// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

use exr::prelude::*;

/// Writes an accumulated bitmap as an OpenEXR file, scaling every pixel by
/// `scale` (typically one over the number of iterations).
pub fn write_exr_to_file(bitmap: &Bitmap, scale: Float, file_path: &str) {
    log::info!("Starting writing openexr image: {}.", file_path);

    let image = bitmap.raw_copy(scale);
    let width = bitmap.width();

    let write_result = write_rgb_file(file_path, width, bitmap.height(), |x, y| {
        image[y * width + x]
    });
    match write_result {
        Ok(()) => log::info!("EXR written to: {}.", file_path),
        Err(e) => log::error!("EXR written error: {}.", e.to_string()),
    }
}
