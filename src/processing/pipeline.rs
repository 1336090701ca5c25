//! Single-slice inference and training-target encoding.
//!
//! Both directions share one normalization and one letterbox so that a
//! model trained on [`encode_training_sample`] output is decoded with the
//! exact inverse in [`predict_landmarks`].

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::PipelineConfig;
use crate::error::LandmarkError;
use crate::frames::{CanvasPoint, Index, IndexPoint, World, WorldPoint};
use crate::io::record::LandmarkRecord;
use crate::landmarks::{LandmarkName, LandmarkSet};
use crate::processing::affine::AffineTransform;
use crate::processing::angles::{compute_angles, SagittalAngles};
use crate::processing::decoder::{decode_heatmaps, DecodedLandmarks};
use crate::processing::heatmaps::render_heatmaps;
use crate::processing::letterbox::{letterbox, LetterboxParams};
use crate::processing::preprocessing::percentile_clip_normalize;
use crate::processing::Slice;

/// The external inference session: one response map per landmark channel,
/// each the size of the canvas.
pub trait Predictor {
    fn predict(&self, canvas: &Slice) -> Result<Vec<Slice>>;
}

impl<F> Predictor for F
where
    F: Fn(&Slice) -> Result<Vec<Slice>>,
{
    fn predict(&self, canvas: &Slice) -> Result<Vec<Slice>> {
        self(canvas)
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub letterbox: LetterboxParams,
    pub decoded: DecodedLandmarks,
    pub landmarks_index: LandmarkSet<Index>,
    /// Physical positions, never flipped.
    pub landmarks_world: LandmarkSet<World>,
    /// Err when the decoded points are degenerate; the landmarks above are
    /// still valid in that case.
    pub angles: std::result::Result<SagittalAngles, LandmarkError>,
}

impl Prediction {
    /// Rows for [`crate::io::output::write_landmarks_csv`], in channel order.
    pub fn rows(&self) -> Vec<(LandmarkName, IndexPoint, WorldPoint)> {
        self.decoded
            .order
            .names()
            .into_iter()
            .map(|name| {
                (
                    name,
                    self.landmarks_index.get(name),
                    self.landmarks_world.get(name),
                )
            })
            .collect()
    }
}

/// normalize -> letterbox -> predict -> decode -> world -> angles.
pub fn predict_landmarks<P: Predictor + ?Sized>(
    predictor: &P,
    slice: &Slice,
    affine: &AffineTransform,
    config: &PipelineConfig,
) -> Result<Prediction> {
    let normalized =
        percentile_clip_normalize(slice, config.percentile_low, config.percentile_high)
            .context("failed to normalize slice")?;
    let (canvas, params) = letterbox(&normalized, config.target_height, config.target_width)
        .context("failed to letterbox slice")?;
    log::debug!(
        "letterboxed {}x{} -> {}x{} (scale {:.4}, pad {}/{})",
        params.source_height,
        params.source_width,
        params.target_height,
        params.target_width,
        params.scale,
        params.pad_x,
        params.pad_y
    );

    let maps = predictor.predict(&canvas).context("predictor failed")?;
    if maps.len() != 5 {
        return Err(LandmarkError::ChannelCount {
            expected: 5,
            found: maps.len(),
        }
        .into());
    }
    let decoded = decode_heatmaps(&maps, &params, config.channel_order)
        .context("failed to decode predictor output")?;
    for (name, p) in decoded.labeled() {
        if !params.contains_source(p) {
            log::warn!("{} decoded outside the source image at {:?}", name, p);
        }
    }

    let landmarks_index = decoded.to_landmark_set()?;
    let landmarks_world = landmarks_index.map(|p| affine.index_to_world_2d(p));
    let measured = if config.flip_x_axis {
        landmarks_world.flip_x()
    } else {
        landmarks_world
    };
    let angles = compute_angles(&measured);
    if let Err(e) = &angles {
        log::warn!("angles unavailable for predicted landmarks: {}", e);
    }

    Ok(Prediction {
        letterbox: params,
        decoded,
        landmarks_index,
        landmarks_world,
        angles,
    })
}

/// Model input and targets for one record.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub case_id: String,
    pub canvas: Slice,
    /// One Gaussian map per landmark, in the configured channel order.
    pub heatmaps: Vec<Slice>,
    pub coords: Vec<CanvasPoint>,
    pub letterbox: LetterboxParams,
}

pub fn encode_training_sample(
    record: &LandmarkRecord,
    slice: &Slice,
    config: &PipelineConfig,
) -> Result<TrainingSample> {
    let landmarks = record
        .landmarks_index()
        .with_context(|| format!("case {}: incomplete landmarks", record.case_id))?;
    let normalized =
        percentile_clip_normalize(slice, config.percentile_low, config.percentile_high)
            .with_context(|| format!("case {}: failed to normalize", record.case_id))?;
    let (canvas, params) = letterbox(&normalized, config.target_height, config.target_width)
        .with_context(|| format!("case {}: failed to letterbox", record.case_id))?;

    let coords: Vec<CanvasPoint> = landmarks
        .to_ordered(config.channel_order)
        .iter()
        .map(|p| params.to_canvas(*p))
        .collect();
    let heatmaps = render_heatmaps(
        &coords,
        config.target_height,
        config.target_width,
        config.heatmap_sigma,
    );

    Ok(TrainingSample {
        case_id: record.case_id.clone(),
        canvas,
        heatmaps,
        coords,
        letterbox: params,
    })
}

/// Encodes many samples in parallel; the first failure aborts the batch.
pub fn encode_training_samples(
    items: &[(LandmarkRecord, Slice)],
    config: &PipelineConfig,
) -> Result<Vec<TrainingSample>> {
    let samples = items
        .par_iter()
        .map(|(record, slice)| encode_training_sample(record, slice, config))
        .collect::<Result<Vec<_>>>()?;
    log::info!("encoded {} training samples", samples.len());
    Ok(samples)
}
