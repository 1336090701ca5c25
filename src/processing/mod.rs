pub mod affine;
pub mod angles;
pub mod decoder;
pub mod heatmaps;
pub mod letterbox;
pub mod pipeline;
pub mod preprocessing;
pub mod vector_math;

use image::{ImageBuffer, Luma};

/// Single-channel float image: a 2D slice, a letterboxed canvas or a
/// predictor response map. Width runs along x (i), height along y (j).
pub type Slice = ImageBuffer<Luma<f32>, Vec<f32>>;
