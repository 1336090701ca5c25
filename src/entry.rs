use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use crate::io::integrity_check::check_record_integrity;
use crate::io::output::write_angles_csv;
use crate::io::record::load_record;
use crate::processing::angles::SagittalAngles;

const RECORD_SUFFIX: &str = "_landmarks.json";

/// All `*_landmarks.json` files directly inside `dir`, sorted by name.
pub fn discover_records<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_record = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(RECORD_SUFFIX));
        if is_record && path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        bail!("no *{} files found in {}", RECORD_SUFFIX, dir.display());
    }
    paths.sort();
    Ok(paths)
}

/// Recomputes angles for every record in `dir` and writes them to
/// `out_csv`. Rows follow the sorted file order.
pub fn run_angle_report<P: AsRef<Path>, Q: AsRef<Path>>(
    dir: P,
    out_csv: Q,
) -> Result<Vec<(String, SagittalAngles)>> {
    let paths = discover_records(&dir)?;
    log::info!("computing angles for {} records", paths.len());

    let rows = paths
        .par_iter()
        .map(|path| -> Result<(String, SagittalAngles)> {
            let record = load_record(path)?;
            let angles = record
                .recompute_angles()
                .with_context(|| format!("failed to measure {}", path.display()))?;
            Ok((record.case_id, angles))
        })
        .collect::<Result<Vec<_>>>()?;

    write_angles_csv(&out_csv, &rows)?;
    log::info!("wrote {}", out_csv.as_ref().display());
    Ok(rows)
}

/// Runs the record integrity checks over a directory. Returns the paths of
/// failing records with their error; an empty vector means every record
/// passed.
pub fn run_consistency_check<P: AsRef<Path>>(
    dir: P,
    angle_tolerance: f64,
) -> Result<Vec<(PathBuf, String)>> {
    let paths = discover_records(&dir)?;
    let failures: Vec<(PathBuf, String)> = paths
        .par_iter()
        .filter_map(|path| {
            let outcome = load_record(path)
                .and_then(|record| check_record_integrity(&record, angle_tolerance));
            outcome.err().map(|e| (path.clone(), format!("{:#}", e)))
        })
        .collect();

    if failures.is_empty() {
        log::info!("all {} records passed", paths.len());
    } else {
        log::warn!("{} of {} records failed", failures.len(), paths.len());
    }
    Ok(failures)
}
