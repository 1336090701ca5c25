use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::frames::{IndexPoint, WorldPoint};
use crate::landmarks::LandmarkName;
use crate::processing::angles::SagittalAngles;

/// One row per case: `case_id,PI,PT,SS,LL`.
pub fn write_angles_csv<P: AsRef<Path>>(path: P, rows: &[(String, SagittalAngles)]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    wtr.write_record(["case_id", "PI", "PT", "SS", "LL"])?;
    for (case_id, angles) in rows {
        wtr.write_record([
            case_id.clone(),
            angles.pi.to_string(),
            angles.pt.to_string(),
            angles.ss.to_string(),
            angles.ll.to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Decoded landmarks of one case, in index and world coordinates.
pub fn write_landmarks_csv<P: AsRef<Path>>(
    path: P,
    case_id: &str,
    landmarks: &[(LandmarkName, IndexPoint, WorldPoint)],
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    wtr.write_record(["case_id", "landmark", "i", "j", "x", "y"])?;
    for (name, index, world) in landmarks {
        wtr.write_record([
            case_id.to_string(),
            name.to_string(),
            index.x.to_string(),
            index.y.to_string(),
            world.x.to_string(),
            world.y.to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
