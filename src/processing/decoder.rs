use crate::error::{LandmarkError, Result};
use crate::frames::{CanvasPoint, Index, IndexPoint, WorldPoint};
use crate::landmarks::{LandmarkName, LandmarkOrder, LandmarkSet};
use crate::processing::affine::AffineTransform;
use crate::processing::letterbox::LetterboxParams;
use crate::processing::Slice;

/// Per-channel peak locations, in channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLandmarks {
    pub order: LandmarkOrder,
    pub canvas: Vec<CanvasPoint>,
    pub index: Vec<IndexPoint>,
}

impl DecodedLandmarks {
    /// Index points paired with their landmark name. Extra channels beyond
    /// the five named ones are dropped.
    pub fn labeled(&self) -> Vec<(LandmarkName, IndexPoint)> {
        self.order
            .names()
            .into_iter()
            .zip(self.index.iter().copied())
            .collect()
    }

    pub fn to_landmark_set(&self) -> Result<LandmarkSet<Index>> {
        LandmarkSet::from_ordered(&self.index, self.order)
    }

    /// World positions of the decoded points with k = 0.
    pub fn to_world(&self, affine: &AffineTransform) -> Vec<WorldPoint> {
        self.index
            .iter()
            .map(|p| affine.index_to_world_2d(*p))
            .collect()
    }
}

/// `(x, y)` of the first maximum in row-major order. NaN pixels are never
/// picked; an all-NaN map yields `(0, 0)`.
///
/// This intentionally differs from numpy's `argmax`, which returns the
/// first NaN it meets. A map with a few NaN pixels still decodes to its
/// real peak here.
pub fn argmax(map: &Slice) -> (u32, u32) {
    let mut best = (0, 0);
    let mut best_value = f32::NEG_INFINITY;
    let mut found = false;
    for (x, y, pixel) in map.enumerate_pixels() {
        let v = pixel[0];
        if v.is_nan() {
            continue;
        }
        if !found || v > best_value {
            best = (x, y);
            best_value = v;
            found = true;
        }
    }
    best
}

/// Takes the peak of every map and carries it back to source index space.
///
/// Every map must have the letterbox target size; the channel count is not
/// checked here so that partial stacks can still be inspected.
pub fn decode_heatmaps(
    maps: &[Slice],
    params: &LetterboxParams,
    order: LandmarkOrder,
) -> Result<DecodedLandmarks> {
    let expected = (params.target_width, params.target_height);
    let mut canvas = Vec::with_capacity(maps.len());
    let mut index = Vec::with_capacity(maps.len());
    for (c, map) in maps.iter().enumerate() {
        if map.dimensions() != expected {
            return Err(LandmarkError::shape(format!(
                "channel {} is {}x{}, expected {}x{}",
                c,
                map.height(),
                map.width(),
                params.target_height,
                params.target_width
            )));
        }
        let (x, y) = argmax(map);
        let p = CanvasPoint::new(x as f64, y as f64);
        canvas.push(p);
        index.push(params.to_source(p));
    }
    Ok(DecodedLandmarks {
        order,
        canvas,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::heatmaps::render_heatmaps;
    use approx::assert_relative_eq;
    use image::{ImageBuffer, Luma};

    fn zeros(w: u32, h: u32) -> Slice {
        ImageBuffer::from_pixel(w, h, Luma([0.0]))
    }

    #[test]
    fn test_argmax_first_occurrence() {
        let mut m = zeros(4, 3);
        m.put_pixel(3, 0, Luma([2.0]));
        m.put_pixel(0, 1, Luma([2.0]));
        assert_eq!(argmax(&m), (3, 0));
        assert_eq!(argmax(&zeros(4, 3)), (0, 0));
        let neg: Slice = ImageBuffer::from_fn(3, 3, |x, y| Luma([-((x + y) as f32) - 1.0]));
        assert_eq!(argmax(&neg), (0, 0));
    }

    #[test]
    fn test_argmax_skips_nan() {
        let mut m = zeros(3, 3);
        m.put_pixel(0, 0, Luma([f32::NAN]));
        m.put_pixel(2, 2, Luma([0.5]));
        assert_eq!(argmax(&m), (2, 2));
        let all_nan: Slice = ImageBuffer::from_pixel(2, 2, Luma([f32::NAN]));
        assert_eq!(argmax(&all_nan), (0, 0));
    }

    #[test]
    fn test_peak_at_pad_corner_maps_to_origin() {
        let p = LetterboxParams::forward(100, 50, 512, 512).unwrap();
        let mut maps: Vec<Slice> = (0..5).map(|_| zeros(512, 512)).collect();
        maps[0].put_pixel(128, 0, Luma([1.0]));
        let d = decode_heatmaps(&maps, &p, LandmarkOrder::Decoder).unwrap();
        assert_eq!(d.canvas[0], CanvasPoint::new(128.0, 0.0));
        assert_eq!(d.index[0], IndexPoint::new(0.0, 0.0));
        assert_eq!(d.labeled()[0].0, LandmarkName::FH);
    }

    #[test]
    fn test_peak_in_padding_is_not_clamped() {
        let p = LetterboxParams::forward(100, 50, 512, 512).unwrap();
        let mut map = zeros(512, 512);
        map.put_pixel(10, 40, Luma([1.0]));
        let d = decode_heatmaps(&[map], &p, LandmarkOrder::Decoder).unwrap();
        assert!(d.index[0].x < 0.0);
        assert!(!p.contains_source(d.index[0]));
    }

    #[test]
    fn test_rendered_targets_decode_to_sources() {
        let p = LetterboxParams::forward(300, 400, 256, 256).unwrap();
        let sources = [
            IndexPoint::new(200.0, 150.0),
            IndexPoint::new(120.5, 80.25),
            IndexPoint::new(10.0, 290.0),
            IndexPoint::new(399.0, 0.0),
            IndexPoint::new(250.0, 260.0),
        ];
        let centers: Vec<CanvasPoint> = sources.iter().map(|s| p.to_canvas(*s)).collect();
        let maps = render_heatmaps(&centers, 256, 256, 2.0);
        let d = decode_heatmaps(&maps, &p, LandmarkOrder::Decoder).unwrap();
        for (got, want) in d.index.iter().zip(sources.iter()) {
            assert!((got.x - want.x).abs() <= 0.5 / p.scale + 1e-9);
            assert!((got.y - want.y).abs() <= 0.5 / p.scale + 1e-9);
        }
        let set = d.to_landmark_set().unwrap();
        assert_eq!(set.fh, d.index[0]);
        assert_eq!(set.l1_post, d.index[4]);
    }

    #[test]
    fn test_wrong_map_size_rejected() {
        let p = LetterboxParams::forward(100, 50, 64, 64).unwrap();
        let maps: Vec<Slice> = vec![zeros(64, 64), zeros(32, 64)];
        assert!(matches!(
            decode_heatmaps(&maps, &p, LandmarkOrder::Decoder),
            Err(LandmarkError::InvalidImageShape { .. })
        ));
    }

    #[test]
    fn test_three_channels_cannot_form_a_set() {
        let p = LetterboxParams::forward(64, 64, 64, 64).unwrap();
        let maps: Vec<Slice> = (0..3).map(|_| zeros(64, 64)).collect();
        let d = decode_heatmaps(&maps, &p, LandmarkOrder::Decoder).unwrap();
        assert_eq!(d.labeled().len(), 3);
        assert_eq!(
            d.to_landmark_set().unwrap_err(),
            LandmarkError::ChannelCount {
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn test_to_world_uses_affine() {
        let p = LetterboxParams::forward(64, 64, 64, 64).unwrap();
        let mut map = zeros(64, 64);
        map.put_pixel(4, 6, Luma([1.0]));
        let d = decode_heatmaps(&[map], &p, LandmarkOrder::Decoder).unwrap();
        let affine = AffineTransform::from_direction_origin(
            [[0.5, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]],
            [10.0, 20.0, 0.0],
        )
        .unwrap();
        let w = d.to_world(&affine);
        assert_relative_eq!(w[0].x, 12.0);
        assert_relative_eq!(w[0].y, 32.0);
    }
}
