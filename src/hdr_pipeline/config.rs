//! Reconstruction configuration types

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::engine::EstimatorConfig;
use crate::hdr_pipeline::tiff::TiffCompression;

/// Largest supported bit depth; decoded samples are stored as `u16`.
pub const MAX_BIT_DEPTH: u32 = 16;

/// Configuration for a bracket to HDR reconstruction
#[derive(Debug, Clone)]
pub struct HdrConfig {
    /// Bits per sample the frames are quantized to; the curve has `2^bit_depth` levels
    pub bit_depth: u32,
    /// Longest-side targets for the estimation passes, ascending (largest applied last)
    pub scales: Vec<usize>,
    /// Iteration bound and stopping threshold of the curve estimator
    pub estimator: EstimatorConfig,
    /// Turn an estimator that gave up into a hard `DidNotConverge` error
    pub fail_on_non_convergence: bool,
    /// Compression of the written radiance TIFF
    pub compression: TiffCompression,
}

impl Default for HdrConfig {
    fn default() -> Self {
        Self {
            bit_depth: 8,
            scales: vec![100, 500, 1000],
            estimator: EstimatorConfig::default(),
            fail_on_non_convergence: false,
            compression: TiffCompression::None,
        }
    }
}

impl HdrConfig {
    pub fn builder() -> HdrConfigBuilder {
        HdrConfigBuilder::default()
    }

    /// Number of discrete intensity levels, `2^bit_depth`.
    pub fn levels(&self) -> usize {
        1usize << self.bit_depth
    }

    pub fn validate(&self) -> Result<()> {
        if self.bit_depth == 0 || self.bit_depth > MAX_BIT_DEPTH {
            return Err(HdrError::InvalidConfig(format!(
                "bit depth must be in 1..={}, got {}",
                MAX_BIT_DEPTH, self.bit_depth
            )));
        }

        if self.scales.is_empty() {
            return Err(HdrError::InvalidConfig("at least one scale is required".to_string()));
        }

        if self.scales.contains(&0) {
            return Err(HdrError::InvalidConfig("scales must be non-zero".to_string()));
        }

        if self.scales.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HdrError::InvalidConfig(format!(
                "scales must be strictly ascending, got {:?}",
                self.scales
            )));
        }

        if self.estimator.max_iterations == 0 {
            return Err(HdrError::InvalidConfig("max_iterations must be at least 1".to_string()));
        }

        if !(self.estimator.epsilon.is_finite() && self.estimator.epsilon > 0.0) {
            return Err(HdrError::InvalidConfig(format!(
                "epsilon must be a positive finite number, got {}",
                self.estimator.epsilon
            )));
        }

        Ok(())
    }
}

/// Builder for HdrConfig
#[derive(Default)]
pub struct HdrConfigBuilder {
    bit_depth: Option<u32>,
    scales: Option<Vec<usize>>,
    max_iterations: Option<usize>,
    epsilon: Option<f64>,
    fail_on_non_convergence: Option<bool>,
    compression: Option<TiffCompression>,
}

impl HdrConfigBuilder {
    pub fn bit_depth(mut self, bits: u32) -> Self {
        self.bit_depth = Some(bits);
        self
    }

    pub fn scales(mut self, scales: Vec<usize>) -> Self {
        self.scales = Some(scales);
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn fail_on_non_convergence(mut self, fail: bool) -> Self {
        self.fail_on_non_convergence = Some(fail);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn build(self) -> HdrConfig {
        let default = HdrConfig::default();
        HdrConfig {
            bit_depth: self.bit_depth.unwrap_or(default.bit_depth),
            scales: self.scales.unwrap_or(default.scales),
            estimator: EstimatorConfig {
                max_iterations: self.max_iterations.unwrap_or(default.estimator.max_iterations),
                epsilon: self.epsilon.unwrap_or(default.estimator.epsilon),
            },
            fail_on_non_convergence: self
                .fail_on_non_convergence
                .unwrap_or(default.fail_on_non_convergence),
            compression: self.compression.unwrap_or(default.compression),
        }
    }
}
