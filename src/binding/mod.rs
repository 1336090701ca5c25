pub mod classes;

use std::collections::HashMap;

use classes::{PyAngles, PyLetterbox};
use image::ImageBuffer;
use nalgebra::Matrix4;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::entry::run_angle_report;
use crate::error::LandmarkError;
use crate::frames::{Point3D, World, WorldPoint};
use crate::landmarks::LandmarkOrder;
use crate::processing::affine::AffineTransform;
use crate::processing::angles::compute_angles_from_map;
use crate::processing::decoder;
use crate::processing::letterbox::LetterboxParams;
use crate::processing::Slice;

impl From<LandmarkError> for PyErr {
    fn from(e: LandmarkError) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

fn parse_order(order: &str) -> PyResult<LandmarkOrder> {
    match order {
        "decoder" => Ok(LandmarkOrder::Decoder),
        "placement" => Ok(LandmarkOrder::Placement),
        other => Err(PyValueError::new_err(format!(
            "order must be 'decoder' or 'placement', got '{}'",
            other
        ))),
    }
}

/// Rows of columns, all rows the same length.
fn map_from_rows(rows: Vec<Vec<f32>>) -> PyResult<Slice> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != width) {
        return Err(PyValueError::new_err("heatmap rows differ in length"));
    }
    let data: Vec<f32> = rows.into_iter().flatten().collect();
    ImageBuffer::from_raw(width as u32, height as u32, data)
        .ok_or_else(|| PyValueError::new_err("heatmap does not match its dimensions"))
}

/// Computes PI, PT, SS and LL from named 2D points.
///
/// Args:
///     points (dict[str, tuple[float, float]]): Must contain FH, S1_ant,
///         S1_post, L1_ant and L1_post; other keys are ignored.
///
/// Returns:
///     dict[str, float]: ``{"PI", "PT", "SS", "LL"}`` in degrees.
///
/// Raises:
///     ValueError: missing landmarks or coincident points.
#[pyfunction]
pub fn compute_angles(points: HashMap<String, (f64, f64)>) -> PyResult<HashMap<String, f64>> {
    let points: HashMap<String, WorldPoint> = points
        .into_iter()
        .map(|(k, p)| (k, WorldPoint::from(p)))
        .collect();
    let angles = compute_angles_from_map(&points)?;
    Ok(PyAngles::from(angles).to_dict())
}

#[pyfunction]
#[pyo3(signature = (height, width, target_height = 512u32, target_width = 512u32))]
pub fn letterbox_params(
    height: u32,
    width: u32,
    target_height: u32,
    target_width: u32,
) -> PyResult<PyLetterbox> {
    Ok(LetterboxParams::forward(height, width, target_height, target_width)?.into())
}

/// Peak of each map, mapped back to source (i, j).
///
/// Args:
///     maps (list[list[list[float]]]): One ``H x W`` map per channel.
///     letterbox (PyLetterbox): Parameters the canvas was built with.
///     order (str): ``"decoder"`` (default) or ``"placement"``.
///
/// Returns:
///     list[tuple[str, float, float]]: ``(name, i, j)`` per channel.
#[pyfunction]
#[pyo3(signature = (maps, letterbox, order = "decoder"))]
pub fn decode_heatmaps(
    maps: Vec<Vec<Vec<f32>>>,
    letterbox: &PyLetterbox,
    order: &str,
) -> PyResult<Vec<(String, f64, f64)>> {
    let order = parse_order(order)?;
    let maps = maps
        .into_iter()
        .map(map_from_rows)
        .collect::<PyResult<Vec<Slice>>>()?;
    let decoded = decoder::decode_heatmaps(&maps, &letterbox.params(), order)?;
    Ok(decoded
        .labeled()
        .into_iter()
        .map(|(name, p)| (name.to_string(), p.x, p.y))
        .collect())
}

#[pyfunction]
pub fn index_to_world(matrix: [[f64; 4]; 4], i: f64, j: f64, k: f64) -> PyResult<(f64, f64, f64)> {
    let affine = AffineTransform::from_index_to_world(matrix4(&matrix))?;
    let p = affine.index_to_world(Point3D::new(i, j, k));
    Ok((p.x, p.y, p.z))
}

/// `matrix` is the index-to-world affine; it is inverted here.
#[pyfunction]
pub fn world_to_index(matrix: [[f64; 4]; 4], x: f64, y: f64, z: f64) -> PyResult<(f64, f64, f64)> {
    let affine = AffineTransform::from_index_to_world(matrix4(&matrix))?;
    let p = affine.world_to_index(Point3D::<World>::new(x, y, z));
    Ok((p.x, p.y, p.z))
}

/// Recomputes angles for every ``*_landmarks.json`` in ``input_dir`` and
/// writes ``case_id,PI,PT,SS,LL`` to ``output_csv``.
#[pyfunction]
pub fn angle_report(input_dir: &str, output_csv: &str) -> PyResult<Vec<(String, PyAngles)>> {
    let rows = run_angle_report(input_dir, output_csv)
        .map_err(|e| PyRuntimeError::new_err(format!("{:#}", e)))?;
    Ok(rows
        .into_iter()
        .map(|(case_id, angles)| (case_id, angles.into()))
        .collect())
}

fn matrix4(rows: &[[f64; 4]; 4]) -> Matrix4<f64> {
    Matrix4::from_fn(|r, c| rows[r][c])
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_angles, m)?)?;
    m.add_function(wrap_pyfunction!(letterbox_params, m)?)?;
    m.add_function(wrap_pyfunction!(decode_heatmaps, m)?)?;
    m.add_function(wrap_pyfunction!(index_to_world, m)?)?;
    m.add_function(wrap_pyfunction!(world_to_index, m)?)?;
    m.add_function(wrap_pyfunction!(angle_report, m)?)?;

    m.add_class::<PyLetterbox>()?;
    m.add_class::<PyAngles>()?;
    Ok(())
}
