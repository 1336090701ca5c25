//! Sagittal spine landmark transforms and alignment angles.
//!
//! Five landmarks (L1 and S1 endplate corners and the femoral head) are
//! carried between slice index space, world space and a letterboxed
//! predictor canvas, and turned into pelvic incidence, pelvic tilt, sacral
//! slope and L1-S1 lordosis.

pub mod config;
pub mod entry;
pub mod error;
pub mod frames;
pub mod io;
pub mod landmarks;
pub mod processing;

mod utils;

#[cfg(feature = "python")]
mod binding;

pub use config::PipelineConfig;
pub use error::LandmarkError;
pub use frames::{CanvasPoint, IndexPoint, WorldPoint};
pub use landmarks::{LandmarkName, LandmarkOrder, LandmarkSet};
pub use processing::angles::{compute_angles, compute_angles_from_map, SagittalAngles};
pub use processing::pipeline::{predict_landmarks, Predictor};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// This is the module importable from Python:
///
/// ```python
/// import sagittalrs as sg
/// sg.compute_angles({"FH": (0.5, 2.0), "S1_ant": (0, 0), "S1_post": (1, 1),
///                    "L1_ant": (0, 1), "L1_post": (1, 2)})
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn sagittalrs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    binding::register(m)
}
