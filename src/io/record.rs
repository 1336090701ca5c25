use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;
use crate::frames::{Index, IndexPoint, Point3D, World, WorldPoint};
use crate::landmarks::{LandmarkName, LandmarkOrder, LandmarkSet};
use crate::processing::affine::AffineTransform;
use crate::processing::angles::{compute_angles, SagittalAngles};

/// Voxel position of one landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IjkPoint {
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

impl IjkPoint {
    pub fn new(i: f64, j: f64, k: f64) -> Self {
        Self { i, j, k }
    }

    pub fn to_point3d(self) -> Point3D<Index> {
        Point3D::new(self.i, self.j, self.k)
    }

    /// In-plane position; `k` is dropped.
    pub fn to_index_2d(self) -> IndexPoint {
        IndexPoint::new(self.i, self.j)
    }
}

/// Geometry of the volume the landmarks were placed on. Fields are optional
/// because training-only records may carry an empty object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<[f64; 3]>,
    /// Direction times spacing, row-major.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ijk_to_ras: Option<[[f64; 3]; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_ras: Option<[f64; 3]>,
}

/// One exported case: landmark voxels, volume geometry and the angles that
/// were measured when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    #[serde(default)]
    pub case_id: String,
    pub landmarks_ijk: BTreeMap<String, IjkPoint>,
    #[serde(default)]
    pub metadata: VolumeMetadata,
    #[serde(default)]
    pub image_shape: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angles_deg: Option<SagittalAngles>,
    #[serde(default)]
    pub flip_x_axis: bool,
}

impl LandmarkRecord {
    /// Builds a record from five hand-placed points in placement order,
    /// measuring the angles in world space with the requested x flip.
    pub fn from_placed_points(
        case_id: &str,
        placed: &[IjkPoint],
        affine: &AffineTransform,
        image_shape: Vec<usize>,
        flip_x_axis: bool,
    ) -> Result<Self> {
        if placed.len() != 5 {
            return Err(LandmarkError::ChannelCount {
                expected: 5,
                found: placed.len(),
            }
            .into());
        }
        let landmarks_ijk: BTreeMap<String, IjkPoint> = LandmarkOrder::Placement
            .names()
            .iter()
            .zip(placed)
            .map(|(name, p)| (name.to_string(), *p))
            .collect();

        let mut record = Self {
            case_id: case_id.to_string(),
            landmarks_ijk,
            metadata: VolumeMetadata {
                spacing: Some(affine.spacing()),
                ijk_to_ras: Some(affine.direction()),
                origin_ras: Some(affine.origin()),
            },
            image_shape,
            angles_deg: None,
            flip_x_axis,
        };
        let angles = record
            .recompute_angles()
            .with_context(|| format!("cannot measure angles for case {}", case_id))?;
        record.angles_deg = Some(angles);
        Ok(record)
    }

    pub fn affine(&self) -> Result<AffineTransform> {
        let direction = self
            .metadata
            .ijk_to_ras
            .ok_or_else(|| anyhow!("case {}: metadata has no ijk_to_ras", self.case_id))?;
        let origin = self
            .metadata
            .origin_ras
            .ok_or_else(|| anyhow!("case {}: metadata has no origin_ras", self.case_id))?;
        AffineTransform::from_direction_origin(direction, origin)
            .with_context(|| format!("case {}: bad ijk_to_ras", self.case_id))
    }

    pub fn landmark(&self, name: LandmarkName) -> Option<IjkPoint> {
        self.landmarks_ijk.get(name.as_str()).copied()
    }

    /// In-plane index positions of the five landmarks.
    pub fn landmarks_index(&self) -> crate::error::Result<LandmarkSet<Index>> {
        let points: HashMap<&str, IndexPoint> = self
            .landmarks_ijk
            .iter()
            .map(|(name, p)| (name.as_str(), p.to_index_2d()))
            .collect();
        LandmarkSet::from_map(&points)
    }

    /// World (x, y) of every landmark, mapped with its full (i, j, k).
    pub fn world_landmarks_2d(&self, flip_x: bool) -> Result<LandmarkSet<World>> {
        let affine = self.affine()?;
        let points: HashMap<&str, WorldPoint> = self
            .landmarks_ijk
            .iter()
            .map(|(name, p)| (name.as_str(), affine.index_to_world(p.to_point3d()).xy()))
            .collect();
        let set = LandmarkSet::from_map(&points)
            .with_context(|| format!("case {}: incomplete landmarks", self.case_id))?;
        Ok(if flip_x { set.flip_x() } else { set })
    }

    /// Angles from the stored landmarks, using the record's own flip setting.
    pub fn recompute_angles(&self) -> Result<SagittalAngles> {
        let world = self.world_landmarks_2d(self.flip_x_axis)?;
        compute_angles(&world).with_context(|| format!("case {}", self.case_id))
    }

    /// Compares stored and recomputed angles.
    pub fn check_angles(&self, tolerance: f64) -> Result<AngleCheck> {
        let stored = self
            .angles_deg
            .ok_or_else(|| anyhow!("case {}: no stored angles", self.case_id))?;
        let recomputed = self.recompute_angles()?;
        let max_abs_diff = stored.max_abs_diff(&recomputed);
        Ok(AngleCheck {
            stored,
            recomputed,
            max_abs_diff,
            within_tolerance: max_abs_diff <= tolerance,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleCheck {
    pub stored: SagittalAngles,
    pub recomputed: SagittalAngles,
    pub max_abs_diff: f64,
    pub within_tolerance: bool,
}

pub fn load_record<P: AsRef<Path>>(path: P) -> Result<LandmarkRecord> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open record {}", path.display()))?;
    let record: LandmarkRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse record {}", path.display()))?;
    log::debug!(
        "loaded record {} ({} landmarks)",
        record.case_id,
        record.landmarks_ijk.len()
    );
    Ok(record)
}

pub fn save_record<P: AsRef<Path>>(path: P, record: &LandmarkRecord) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record)
        .with_context(|| format!("failed to write record {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
