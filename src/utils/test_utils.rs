use std::path::{Path, PathBuf};

use crate::io::record::{save_record, LandmarkRecord};

/// Identity-affine record whose landmarks give SS -45, LL 0, PT 0, PI 45.
pub const SAMPLE_JSON: &str = r#"{
    "case_id": "case_001",
    "landmarks_ijk": {
        "L1_ant":  {"i": 0.0, "j": 1.0, "k": 0.0},
        "L1_post": {"i": 1.0, "j": 2.0, "k": 0.0},
        "S1_ant":  {"i": 0.0, "j": 0.0, "k": 0.0},
        "S1_post": {"i": 1.0, "j": 1.0, "k": 0.0},
        "FH":      {"i": 0.5, "j": 2.0, "k": 0.0}
    },
    "metadata": {
        "spacing": [1.0, 1.0, 1.0],
        "ijk_to_ras": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        "origin_ras": [0.0, 0.0, 0.0]
    },
    "image_shape": [1, 64, 64],
    "angles_deg": {"PI": 45.0, "PT": 0.0, "SS": -45.0, "LL": 0.0},
    "flip_x_axis": false
}"#;

pub fn sample_record(case_id: &str) -> LandmarkRecord {
    let mut record: LandmarkRecord =
        serde_json::from_str(SAMPLE_JSON).expect("sample record must parse");
    record.case_id = case_id.to_string();
    record
}

/// Writes `case_000_landmarks.json`, `case_001_landmarks.json`, ... into
/// `dir`, scaling landmark positions by `case + 1` so each case differs.
pub fn write_sample_records(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|case| {
            let id = format!("case_{:03}", case);
            let mut record = sample_record(&id);
            let factor = (case + 1) as f64;
            for p in record.landmarks_ijk.values_mut() {
                p.i *= factor;
                p.j *= factor;
            }
            let path = dir.join(format!("{}_landmarks.json", id));
            save_record(&path, &record).expect("sample record must save");
            path
        })
        .collect()
}
