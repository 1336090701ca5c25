use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::frames::{Frame, Point2D, Vector2D};
use crate::landmarks::LandmarkSet;
use crate::processing::vector_math::{
    angle_between, midpoint, signed_slope_angle, signed_vertical_angle, vector_from_points,
    wrap_signed,
};

/// Sagittal alignment angles in degrees.
///
/// `pi` is in [0, 90], `pt` and `ss` in [-90, 90], `ll` in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SagittalAngles {
    #[serde(rename = "PI")]
    pub pi: f64,
    #[serde(rename = "PT")]
    pub pt: f64,
    #[serde(rename = "SS")]
    pub ss: f64,
    #[serde(rename = "LL")]
    pub ll: f64,
}

impl SagittalAngles {
    pub fn as_array(&self) -> [(&'static str, f64); 4] {
        [("PI", self.pi), ("PT", self.pt), ("SS", self.ss), ("LL", self.ll)]
    }

    /// Largest absolute difference between corresponding angles.
    pub fn max_abs_diff(&self, other: &SagittalAngles) -> f64 {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .map(|((_, a), (_, b))| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

/// Computes PI, PT, SS and LL from the five landmarks.
///
/// The set can be in any single 2D frame whose y axis points caudally
/// (image rows, or world y after whatever flip the caller applied). Either
/// all four angles are returned or the first degenerate vector is reported.
pub fn compute_angles<F: Frame>(landmarks: &LandmarkSet<F>) -> Result<SagittalAngles> {
    let v_s1 = vector_from_points(landmarks.s1_ant, landmarks.s1_post);
    let v_l1 = vector_from_points(landmarks.l1_ant, landmarks.l1_post);
    let s1_mid = midpoint(landmarks.s1_ant, landmarks.s1_post);
    let v_pelvis = vector_from_points(landmarks.fh, s1_mid);

    let ss = signed_slope_angle(v_s1)?;
    let pt = signed_vertical_angle(v_pelvis)?;
    let ll = lumbosacral_lordosis(v_l1, v_s1)?;
    let pi = pelvic_incidence(v_pelvis, v_s1)?;

    Ok(SagittalAngles { pi, pt, ss, ll })
}

/// Name-keyed entry point; runs the completeness check first.
pub fn compute_angles_from_map<F: Frame, K: AsRef<str>>(
    points: &HashMap<K, Point2D<F>>,
) -> Result<SagittalAngles> {
    let landmarks = LandmarkSet::from_map(points)?;
    compute_angles(&landmarks)
}

/// |90 - angle(pelvis, S1 endplate)|, taken from the pelvis/S1 angle itself
/// rather than from PT + SS so it holds under either slope sign convention.
pub fn pelvic_incidence<F: Frame>(v_pelvis: Vector2D<F>, v_s1: Vector2D<F>) -> Result<f64> {
    let theta = angle_between(v_pelvis, v_s1)?;
    Ok((90.0 - theta).abs())
}

/// Signed L1-S1 Cobb angle: slope(S1) - slope(L1), wrapped to [-180, 180].
pub fn lumbosacral_lordosis<F: Frame>(v_l1: Vector2D<F>, v_s1: Vector2D<F>) -> Result<f64> {
    let slope_l1 = signed_slope_angle(v_l1)?;
    let slope_s1 = signed_slope_angle(v_s1)?;
    Ok(wrap_signed(slope_s1 - slope_l1))
}
