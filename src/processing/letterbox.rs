use image::{ImageBuffer, Luma};

use crate::error::{LandmarkError, Result};
use crate::frames::{CanvasPoint, IndexPoint};
use crate::processing::preprocessing::resize_bilinear;
use crate::processing::Slice;

/// Parameters of one aspect-preserving resize into a fixed canvas.
///
/// `scale` and the pads fully determine [`LetterboxParams::to_canvas`] and
/// its inverse; the integer sizes are what the pixel resampling must use for
/// that inverse to hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxParams {
    pub scale: f64,
    pub pad_x: f64,
    pub pad_y: f64,
    pub source_height: u32,
    pub source_width: u32,
    pub new_height: u32,
    pub new_width: u32,
    pub target_height: u32,
    pub target_width: u32,
}

impl LetterboxParams {
    /// Fits an `h x w` source into `target_h x target_w`.
    ///
    /// `h * scale` is rounded half-to-even; pads are the floor of half the
    /// leftover, so any odd pixel of margin ends up bottom/right.
    pub fn forward(h: u32, w: u32, target_h: u32, target_w: u32) -> Result<Self> {
        if h == 0 || w == 0 {
            return Err(LandmarkError::shape(format!(
                "source must be non-empty, got {}x{}",
                h, w
            )));
        }
        if target_h == 0 || target_w == 0 {
            return Err(LandmarkError::shape(format!(
                "target must be non-empty, got {}x{}",
                target_h, target_w
            )));
        }

        let scale = (target_h as f64 / h as f64).min(target_w as f64 / w as f64);
        let new_height = scaled_len(h, scale, target_h);
        let new_width = scaled_len(w, scale, target_w);
        let pad_y = ((target_h - new_height) / 2) as f64;
        let pad_x = ((target_w - new_width) / 2) as f64;

        Ok(Self {
            scale,
            pad_x,
            pad_y,
            source_height: h,
            source_width: w,
            new_height,
            new_width,
            target_height: target_h,
            target_width: target_w,
        })
    }

    pub fn to_canvas(&self, p: IndexPoint) -> CanvasPoint {
        CanvasPoint::new(p.x * self.scale + self.pad_x, p.y * self.scale + self.pad_y)
    }

    pub fn to_source(&self, p: CanvasPoint) -> IndexPoint {
        IndexPoint::new((p.x - self.pad_x) / self.scale, (p.y - self.pad_y) / self.scale)
    }

    /// Whether a source-space point falls on the original image.
    pub fn contains_source(&self, p: IndexPoint) -> bool {
        within_extent(p, self.source_height as f64, self.source_width as f64)
    }
}

/// Whether `p` lies in `[0, width) x [0, height)`, so the whole last pixel
/// counts as inside.
pub fn within_extent(p: IndexPoint, height: f64, width: f64) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x < width && p.y < height
}

/// Resamples `slice` to exactly `new_width x new_height` and centers it on a
/// zero canvas of the target size.
pub fn letterbox_slice(slice: &Slice, params: &LetterboxParams) -> Result<Slice> {
    if slice.dimensions() != (params.source_width, params.source_height) {
        return Err(LandmarkError::shape(format!(
            "slice is {}x{} but letterbox was computed for {}x{}",
            slice.height(),
            slice.width(),
            params.source_height,
            params.source_width
        )));
    }

    let resized = resize_bilinear(slice, params.new_height, params.new_width)?;
    let pad_x = params.pad_x as u32;
    let pad_y = params.pad_y as u32;
    let mut canvas: Slice = ImageBuffer::from_pixel(
        params.target_width,
        params.target_height,
        Luma([0.0f32]),
    );
    for (x, y, pixel) in resized.enumerate_pixels() {
        canvas.put_pixel(x + pad_x, y + pad_y, *pixel);
    }
    Ok(canvas)
}

/// Computes the parameters for `slice` and applies them.
pub fn letterbox(slice: &Slice, target_h: u32, target_w: u32) -> Result<(Slice, LetterboxParams)> {
    let params = LetterboxParams::forward(slice.height(), slice.width(), target_h, target_w)?;
    let canvas = letterbox_slice(slice, &params)?;
    Ok((canvas, params))
}

fn scaled_len(len: u32, scale: f64, limit: u32) -> u32 {
    // the 1-pixel floor only matters for extreme aspect ratios
    ((len as f64 * scale).round_ties_even() as u32).clamp(1, limit)
}
