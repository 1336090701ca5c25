use image::{ImageBuffer, Luma};

use crate::error::{LandmarkError, Result};
use crate::processing::Slice;

/// Added to the clip range so a flat slice normalizes to zero instead of NaN.
pub const NORM_EPS: f32 = 1e-6;

/// Wraps a row-major `[H, W]` or `[D, H, W]` array as a slice. For 3D input
/// only the first slice along D is used.
pub fn slice_from_volume(data: &[f32], shape: &[usize]) -> Result<Slice> {
    let (h, w) = match shape {
        [h, w] => (*h, *w),
        [_, h, w] => (*h, *w),
        _ => {
            return Err(LandmarkError::shape(format!(
                "expected a 2D or 3D array, got rank {}",
                shape.len()
            )))
        }
    };
    if shape.contains(&0) {
        return Err(LandmarkError::shape(format!(
            "shape {:?} has a zero dimension",
            shape
        )));
    }
    let expected: usize = shape.iter().product();
    if expected != data.len() {
        return Err(LandmarkError::shape(format!(
            "shape {:?} needs {} values, got {}",
            shape,
            expected,
            data.len()
        )));
    }
    let width = u32::try_from(w).map_err(|_| LandmarkError::shape("width exceeds u32"))?;
    let height = u32::try_from(h).map_err(|_| LandmarkError::shape("height exceeds u32"))?;

    ImageBuffer::from_raw(width, height, data[..h * w].to_vec())
        .ok_or_else(|| LandmarkError::shape("buffer does not match dimensions"))
}

/// Linear-interpolated percentile, `p` in [0, 100]. `None` for empty input.
pub fn percentile(values: &[f32], p: f64) -> Option<f32> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    percentile_of_sorted(&sorted, p)
}

fn percentile_of_sorted(sorted: &[f32], p: f64) -> Option<f32> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    let value = sorted[lo] as f64 + (sorted[hi] as f64 - sorted[lo] as f64) * frac;
    Some(value as f32)
}

/// Clips to the `[p_low, p_high]` percentile range and rescales into [0, 1).
pub fn percentile_clip_normalize(slice: &Slice, p_low: f64, p_high: f64) -> Result<Slice> {
    let mut sorted = slice.as_raw().clone();
    sorted.sort_by(f32::total_cmp);
    let lo = percentile_of_sorted(&sorted, p_low)
        .ok_or_else(|| LandmarkError::shape("cannot normalize an empty slice"))?;
    let hi = percentile_of_sorted(&sorted, p_high)
        .ok_or_else(|| LandmarkError::shape("cannot normalize an empty slice"))?;
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return Err(LandmarkError::shape(format!(
            "percentile range [{}, {}] is not usable",
            lo, hi
        )));
    }

    let range = hi - lo + NORM_EPS;
    let mut out = slice.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = (pixel[0].clamp(lo, hi) - lo) / range;
    }
    Ok(out)
}

/// Source sample positions for `out` outputs spread over `n` inputs with the
/// end points aligned: `(lower index, upper index, weight of upper)`.
fn axis_taps(n: u32, out: u32) -> Vec<(u32, u32, f32)> {
    if out == 1 || n == 1 {
        return vec![(0, 0, 0.0); out as usize];
    }
    let step = (n - 1) as f64 / (out - 1) as f64;
    (0..out)
        .map(|i| {
            let pos = i as f64 * step;
            let lo = (pos.floor() as u32).min(n - 1);
            let hi = (lo + 1).min(n - 1);
            (lo, hi, (pos - lo as f64) as f32)
        })
        .collect()
}

/// Bilinear resize to `new_h x new_w`, rows first, then columns.
pub fn resize_bilinear(slice: &Slice, new_h: u32, new_w: u32) -> Result<Slice> {
    let (w, h) = slice.dimensions();
    if w == 0 || h == 0 || new_w == 0 || new_h == 0 {
        return Err(LandmarkError::shape(format!(
            "cannot resize {}x{} to {}x{}",
            h, w, new_h, new_w
        )));
    }

    let x_taps = axis_taps(w, new_w);
    let rows: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_fn(new_w, h, |x, y| {
        let (x0, x1, t) = x_taps[x as usize];
        let a = slice.get_pixel(x0, y)[0];
        let b = slice.get_pixel(x1, y)[0];
        Luma([a + (b - a) * t])
    });

    let y_taps = axis_taps(h, new_h);
    Ok(ImageBuffer::from_fn(new_w, new_h, |x, y| {
        let (y0, y1, t) = y_taps[y as usize];
        let a = rows.get_pixel(x, y0)[0];
        let b = rows.get_pixel(x, y1)[0];
        Luma([a + (b - a) * t])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slice_from_volume_takes_first_slice() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let s = slice_from_volume(&data, &[2, 2, 3]).unwrap();
        assert_eq!(s.dimensions(), (3, 2));
        assert_eq!(s.get_pixel(2, 1)[0], 5.0);

        let s = slice_from_volume(&data, &[3, 4]).unwrap();
        assert_eq!(s.dimensions(), (4, 3));
        assert_eq!(s.get_pixel(0, 2)[0], 8.0);
    }

    #[test]
    fn test_slice_from_volume_bad_shapes() {
        let data = vec![0.0f32; 8];
        assert!(slice_from_volume(&data, &[8]).is_err());
        assert!(slice_from_volume(&data, &[1, 1, 2, 4]).is_err());
        assert!(slice_from_volume(&data, &[3, 3]).is_err());
        assert!(slice_from_volume(&[], &[0, 4]).is_err());
    }

    #[test]
    fn test_slice_from_volume_zero_depth() {
        let err = slice_from_volume(&[], &[0, 4, 4]).unwrap_err();
        assert!(matches!(err, LandmarkError::InvalidImageShape { .. }));
        assert!(slice_from_volume(&[], &[2, 0, 4]).is_err());
    }

    #[test]
    fn test_percentile_linear() {
        let v = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile(&v, 0.0).unwrap(), 1.0);
        assert_relative_eq!(percentile(&v, 50.0).unwrap(), 3.0);
        assert_relative_eq!(percentile(&v, 100.0).unwrap(), 5.0);
        // rank 0.4 between 1 and 2
        assert_relative_eq!(percentile(&v, 10.0).unwrap(), 1.4, epsilon = 1e-6);
        assert!(percentile(&[], 50.0).is_none());
    }

    #[test]
    fn test_normalize_maps_into_unit_range() {
        let s: Slice = ImageBuffer::from_fn(20, 10, |x, y| Luma([(x * y) as f32 - 30.0]));
        let n = percentile_clip_normalize(&s, 1.0, 99.0).unwrap();
        for p in n.pixels() {
            assert!((0.0..=1.0).contains(&p[0]));
        }
        let max = n.pixels().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!(max > 0.99);
    }

    #[test]
    fn test_normalize_constant_slice_is_zero() {
        let s: Slice = ImageBuffer::from_pixel(4, 4, Luma([7.0]));
        let n = percentile_clip_normalize(&s, 1.0, 99.0).unwrap();
        assert!(n.pixels().all(|p| p[0] == 0.0));
    }

    #[test]
    fn test_resize_bilinear_ramp() {
        let s: Slice = ImageBuffer::from_fn(3, 1, |x, _| Luma([x as f32 * 10.0]));
        let r = resize_bilinear(&s, 1, 5).unwrap();
        let values: Vec<f32> = r.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0.0, 5.0, 10.0, 15.0, 20.0]);

        let r = resize_bilinear(&s, 2, 2).unwrap();
        assert_eq!(r.get_pixel(0, 1)[0], 0.0);
        assert_eq!(r.get_pixel(1, 0)[0], 20.0);
    }

    #[test]
    fn test_resize_degenerate_sizes() {
        let s: Slice = ImageBuffer::from_pixel(1, 1, Luma([3.0]));
        let r = resize_bilinear(&s, 4, 2).unwrap();
        assert!(r.pixels().all(|p| p[0] == 3.0));
        assert!(resize_bilinear(&s, 0, 2).is_err());
    }
}
