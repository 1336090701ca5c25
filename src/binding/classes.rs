use pyo3::prelude::*;

use crate::frames::{CanvasPoint, IndexPoint};
use crate::processing::angles::SagittalAngles;
use crate::processing::letterbox::LetterboxParams;

/// Aspect-preserving resize parameters.
///
/// Attributes:
///     scale (float): Source-to-canvas scale factor
///     pad_x (float): Left padding in canvas pixels
///     pad_y (float): Top padding in canvas pixels
///     new_height (int), new_width (int): Size of the resized content
///     target_height (int), target_width (int): Canvas size
///
/// Example:
///     >>> lb = letterbox_params(100, 50, 512, 512)
///     >>> lb.to_canvas(0.0, 0.0)
///     (128.0, 0.0)
#[pyclass]
#[derive(Debug, Clone)]
pub struct PyLetterbox {
    #[pyo3(get)]
    pub scale: f64,
    #[pyo3(get)]
    pub pad_x: f64,
    #[pyo3(get)]
    pub pad_y: f64,
    #[pyo3(get)]
    pub source_height: u32,
    #[pyo3(get)]
    pub source_width: u32,
    #[pyo3(get)]
    pub new_height: u32,
    #[pyo3(get)]
    pub new_width: u32,
    #[pyo3(get)]
    pub target_height: u32,
    #[pyo3(get)]
    pub target_width: u32,
}

#[pymethods]
impl PyLetterbox {
    /// Source (i, j) to canvas (x, y).
    fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        self.params()
            .to_canvas(IndexPoint::new(x, y))
            .to_tuple()
    }

    /// Canvas (x, y) back to source (i, j). Points in the padding map
    /// outside the source image and are not clamped.
    fn to_source(&self, x: f64, y: f64) -> (f64, f64) {
        self.params()
            .to_source(CanvasPoint::new(x, y))
            .to_tuple()
    }

    fn __repr__(&self) -> String {
        format!(
            "Letterbox(scale={:.4}, pad_x={}, pad_y={}, new={}x{}, target={}x{})",
            self.scale,
            self.pad_x,
            self.pad_y,
            self.new_height,
            self.new_width,
            self.target_height,
            self.target_width
        )
    }
}

impl PyLetterbox {
    pub fn params(&self) -> LetterboxParams {
        LetterboxParams {
            scale: self.scale,
            pad_x: self.pad_x,
            pad_y: self.pad_y,
            source_height: self.source_height,
            source_width: self.source_width,
            new_height: self.new_height,
            new_width: self.new_width,
            target_height: self.target_height,
            target_width: self.target_width,
        }
    }
}

impl From<LetterboxParams> for PyLetterbox {
    fn from(p: LetterboxParams) -> Self {
        Self {
            scale: p.scale,
            pad_x: p.pad_x,
            pad_y: p.pad_y,
            source_height: p.source_height,
            source_width: p.source_width,
            new_height: p.new_height,
            new_width: p.new_width,
            target_height: p.target_height,
            target_width: p.target_width,
        }
    }
}

/// Sagittal angles in degrees.
///
/// Attributes:
///     pi (float): Pelvic incidence, [0, 90]
///     pt (float): Pelvic tilt, [-90, 90]
///     ss (float): Sacral slope, [-90, 90]
///     ll (float): L1-S1 lordosis, [-180, 180]
#[pyclass]
#[derive(Debug, Clone, Copy)]
pub struct PyAngles {
    #[pyo3(get, set)]
    pub pi: f64,
    #[pyo3(get, set)]
    pub pt: f64,
    #[pyo3(get, set)]
    pub ss: f64,
    #[pyo3(get, set)]
    pub ll: f64,
}

#[pymethods]
impl PyAngles {
    #[new]
    fn new(pi: f64, pt: f64, ss: f64, ll: f64) -> Self {
        Self { pi, pt, ss, ll }
    }

    /// `{"PI": .., "PT": .., "SS": .., "LL": ..}`
    pub fn to_dict(&self) -> std::collections::HashMap<String, f64> {
        SagittalAngles::from(*self)
            .as_array()
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Angles(PI={:.2}, PT={:.2}, SS={:.2}, LL={:.2})",
            self.pi, self.pt, self.ss, self.ll
        )
    }
}

impl From<SagittalAngles> for PyAngles {
    fn from(a: SagittalAngles) -> Self {
        Self {
            pi: a.pi,
            pt: a.pt,
            ss: a.ss,
            ll: a.ll,
        }
    }
}

impl From<PyAngles> for SagittalAngles {
    fn from(a: PyAngles) -> Self {
        Self {
            pi: a.pi,
            pt: a.pt,
            ss: a.ss,
            ll: a.ll,
        }
    }
}
