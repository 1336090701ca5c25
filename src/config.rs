use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::landmarks::LandmarkOrder;

/// Settings shared by inference and training-target encoding.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub target_height: u32,
    pub target_width: u32,
    /// Lower clip percentile, in [0, 100].
    pub percentile_low: f64,
    pub percentile_high: f64,
    /// Gaussian sigma of training heatmaps, in canvas pixels.
    pub heatmap_sigma: f64,
    /// Mirror world x before computing angles.
    pub flip_x_axis: bool,
    /// Landmark meaning of predictor channels 0..5.
    pub channel_order: LandmarkOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_height: 512,
            target_width: 512,
            percentile_low: 1.0,
            percentile_high: 99.0,
            heatmap_sigma: 3.0,
            flip_x_axis: false,
            channel_order: LandmarkOrder::Decoder,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: PipelineConfig =
            toml::from_str(text).context("failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("failed to serialize pipeline config")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target_height == 0 || self.target_width == 0 {
            bail!(
                "target size must be positive, got {}x{}",
                self.target_height,
                self.target_width
            );
        }
        let (lo, hi) = (self.percentile_low, self.percentile_high);
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo >= hi {
            bail!("percentiles must satisfy 0 <= low < high <= 100, got {} and {}", lo, hi);
        }
        if self.heatmap_sigma.is_nan() || self.heatmap_sigma <= 0.0 {
            bail!("heatmap_sigma must be positive, got {}", self.heatmap_sigma);
        }
        Ok(())
    }
}
