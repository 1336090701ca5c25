use anyhow::{anyhow, Result};

use super::record::LandmarkRecord;
use crate::frames::IndexPoint;
use crate::landmarks::REQUIRED_KEYS;
use crate::processing::letterbox::within_extent;

/// Runs every structural check on a record and stops at the first failure.
///
/// Angle agreement is checked last and only when the record stores angles;
/// `angle_tolerance` is in degrees.
pub fn check_record_integrity(record: &LandmarkRecord, angle_tolerance: f64) -> Result<()> {
    let checks: &[(&str, fn(&LandmarkRecord) -> Result<()>)] = &[
        ("check_landmarks_complete", check_landmarks_complete),
        ("check_landmarks_finite", check_landmarks_finite),
        ("check_image_shape", check_image_shape),
        ("check_landmarks_inside_image", check_landmarks_inside_image),
        ("check_affine", check_affine),
    ];

    for (name, f) in checks {
        if let Err(e) = f(record) {
            log::warn!("integrity check '{}' failed for {}: {}", name, record.case_id, e);
            return Err(e);
        }
    }

    if record.angles_deg.is_some() {
        let check = record.check_angles(angle_tolerance)?;
        if !check.within_tolerance {
            return Err(anyhow!(
                "case {}: stored angles differ from recomputed by {:.3} deg (stored {:?}, recomputed {:?})",
                record.case_id,
                check.max_abs_diff,
                check.stored,
                check.recomputed
            ));
        }
    }
    Ok(())
}

fn check_landmarks_complete(record: &LandmarkRecord) -> Result<()> {
    record.landmarks_index()?;
    Ok(())
}

fn check_landmarks_finite(record: &LandmarkRecord) -> Result<()> {
    for name in REQUIRED_KEYS {
        if let Some(p) = record.landmark(name) {
            if !(p.i.is_finite() && p.j.is_finite() && p.k.is_finite()) {
                return Err(anyhow!("landmark {} has a non-finite coordinate: {:?}", name, p));
            }
        }
    }
    Ok(())
}

/// `[H, W]` or `[D, H, W]`, all non-zero. An empty shape means "unknown".
fn check_image_shape(record: &LandmarkRecord) -> Result<()> {
    let shape = &record.image_shape;
    if shape.is_empty() {
        return Ok(());
    }
    if !(shape.len() == 2 || shape.len() == 3) {
        return Err(anyhow!("image_shape must have 2 or 3 entries, got {:?}", shape));
    }
    if shape.contains(&0) {
        return Err(anyhow!("image_shape has a zero dimension: {:?}", shape));
    }
    Ok(())
}

fn check_landmarks_inside_image(record: &LandmarkRecord) -> Result<()> {
    let (h, w) = match record.image_shape.as_slice() {
        [h, w] | [_, h, w] => (*h as f64, *w as f64),
        _ => return Ok(()),
    };
    for name in REQUIRED_KEYS {
        if let Some(p) = record.landmark(name) {
            if !within_extent(IndexPoint::new(p.i, p.j), h, w) {
                return Err(anyhow!(
                    "landmark {} at (i={}, j={}) lies outside the {}x{} image",
                    name,
                    p.i,
                    p.j,
                    h,
                    w
                ));
            }
        }
    }
    Ok(())
}

/// Only enforced when the metadata carries an affine at all.
fn check_affine(record: &LandmarkRecord) -> Result<()> {
    let meta = &record.metadata;
    if meta.ijk_to_ras.is_none() && meta.origin_ras.is_none() {
        return Ok(());
    }
    record.affine()?;
    Ok(())
}
