use image::{ImageBuffer, Luma};

use crate::frames::CanvasPoint;
use crate::processing::Slice;

/// Isotropic Gaussian response centered on `center`, peak value 1.
pub fn render_heatmap(center: CanvasPoint, height: u32, width: u32, sigma: f64) -> Slice {
    let denom = 2.0 * sigma * sigma;
    ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as f64 - center.x;
        let dy = y as f64 - center.y;
        Luma([(-(dx * dx + dy * dy) / denom).exp() as f32])
    })
}

/// One map per point, in the order given.
pub fn render_heatmaps(points: &[CanvasPoint], height: u32, width: u32, sigma: f64) -> Vec<Slice> {
    points
        .iter()
        .map(|p| render_heatmap(*p, height, width, sigma))
        .collect()
}
