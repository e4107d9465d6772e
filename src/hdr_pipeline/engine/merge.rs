//! Radiance merging: fuses a bracket of frames into one radiance image given a
//! response curve and the level weights.

use rayon::prelude::*;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::engine::curve::ResponseCurve;
use crate::hdr_pipeline::engine::weight::WeightTable;
use crate::hdr_pipeline::frame::types::{CHANNELS, Frame};

/// Samples per output pixel: RGB radiance plus an opaque alpha.
pub const OUTPUT_CHANNELS: usize = 4;

/// Fused radiance, interleaved RGBA `f32`
#[derive(Debug, Clone)]
pub struct RadianceImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl RadianceImage {
    pub fn pixel(&self, x: usize, y: usize) -> [f32; OUTPUT_CHANNELS] {
        let i = (y * self.width + x) * OUTPUT_CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn row(&self, y: usize) -> &[f32] {
        let stride = self.width * OUTPUT_CHANNELS;
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// Checks that a batch is non-empty, evenly sized and quantized to `levels`.
/// Returns the shared dimensions.
pub(crate) fn batch_dimensions(frames: &[Frame], levels: usize) -> Result<(usize, usize)> {
    let first = frames.first().ok_or(HdrError::EmptyBatch)?;
    let (width, height) = (first.width(), first.height());

    for (index, frame) in frames.iter().enumerate() {
        if frame.width() != width || frame.height() != height {
            return Err(HdrError::DimensionMismatch {
                index,
                width: frame.width(),
                height: frame.height(),
                expected_width: width,
                expected_height: height,
            });
        }
        if frame.levels() != levels {
            return Err(HdrError::InvalidConfig(format!(
                "frame {} has {} levels, curve has {}",
                index,
                frame.levels(),
                levels
            )));
        }
    }

    Ok((width, height))
}

/// Merged radiance at full precision, interleaved RGB.
///
/// Consumed by the estimator; only the final image is narrowed to `f32`.
#[derive(Debug, Clone)]
pub(crate) struct FusedRadiance {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl FusedRadiance {
    pub fn row(&self, y: usize) -> &[f64] {
        let stride = self.width * CHANNELS;
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// Per pixel and channel computes
/// `sum(curve[l] * w[l] * k) / sum(w[l] * k^2)` over frames, where `l` is the
/// frame's level and `k` its brightness coefficient, or 0 when every sample
/// carries zero weight. Rows are processed in parallel; inputs are not modified.
pub(crate) fn fuse_frames(
    frames: &[Frame],
    curve: &ResponseCurve,
    weights: &WeightTable,
) -> Result<FusedRadiance> {
    let levels = curve.levels();
    if weights.len() != levels {
        return Err(HdrError::InvalidConfig(format!(
            "weight table has {} levels, curve has {}",
            weights.len(),
            levels
        )));
    }
    let (width, height) = batch_dimensions(frames, levels)?;

    let mut data = vec![0.0f64; width * height * CHANNELS];
    data.par_chunks_mut(width * CHANNELS)
        .enumerate()
        .for_each(|(y, out_row)| {
            let rows: Vec<(&[u16], f64)> = frames.iter().map(|f| (f.row(y), f.brightness())).collect();

            for (x, out) in out_row.chunks_exact_mut(CHANNELS).enumerate() {
                for (c, value) in out.iter_mut().enumerate() {
                    let response = curve.channel(c);
                    let mut numerator = 0.0;
                    let mut denominator = 0.0;
                    for &(row, k) in &rows {
                        let level = row[x * CHANNELS + c] as usize;
                        let w = weights[level];
                        numerator += response[level] * w * k;
                        denominator += w * k * k;
                    }
                    *value = if denominator != 0.0 {
                        numerator / denominator
                    } else {
                        0.0
                    };
                }
            }
        });

    Ok(FusedRadiance { width, height, data })
}

/// Merges `frames` into one RGBA radiance image with opaque alpha.
///
/// Per channel the radiance is `sum(curve[l] * w[l] * k) / sum(w[l] * k^2)`
/// over frames, 0 where every sample carries zero weight.
pub fn merge_frames(
    frames: &[Frame],
    curve: &ResponseCurve,
    weights: &WeightTable,
) -> Result<RadianceImage> {
    let fused = fuse_frames(frames, curve, weights)?;

    let data = fused
        .data
        .chunks_exact(CHANNELS)
        .flat_map(|px| [px[0] as f32, px[1] as f32, px[2] as f32, 1.0])
        .collect();

    Ok(RadianceImage {
        width: fused.width,
        height: fused.height,
        data,
    })
}
