//! RAW exposure reader built on rawloader and the bayer demosaicing crate.
//!
//! Camera RAW files are the natural input for HDR brackets since they have not
//! been through an in-camera tone curve yet. The reader decodes the sensor
//! data, demosaics RGGB mosaics with bilinear interpolation, removes the black
//! level and applies white balance. No color matrix is applied.

use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::reader::FrameReader;
use crate::hdr_pipeline::frame::types::{CHANNELS, RgbImageData};

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

/// RAW frame reader that uses the rawloader library for decoding.
///
/// Supports any format rawloader can decode (ARW, CR2, NEF, RAF, DNG, ...).
/// Mosaiced sensors are assumed to use an RGGB pattern.
pub struct RawLoaderReader;

impl FrameReader for RawLoaderReader {
    fn read_frame(&self, data: &[u8]) -> Result<RgbImageData> {
        debug!("Decoding RAW frame, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| HdrError::FrameLoadFailure(e.to_string()))?;

        let width = decoded.width;
        let height = decoded.height;
        if width == 0 || height == 0 {
            return Err(HdrError::FrameLoadFailure(format!(
                "decoded an empty {}x{} image",
                width, height
            )));
        }

        // Integer data is used directly, float data (normalized 0.0-1.0) is scaled to u16
        let sensor: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
            }
        };

        let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let bits_per_sample = if max_white_level == 0 {
            DEFAULT_BITS_PER_SAMPLE
        } else {
            U16_BITS - max_white_level.leading_zeros()
        };

        debug!(
            "Decoded RAW: {}x{}, cpp={}, bits_per_sample={} (max white level {})",
            width, height, decoded.cpp, bits_per_sample, max_white_level
        );

        let rgb = match decoded.cpp {
            1 => demosaic_rggb(&sensor, width, height)?,
            3 => sensor,
            cpp => {
                return Err(HdrError::UnsupportedColorSpace(format!(
                    "RAW data with {} components per pixel",
                    cpp
                )));
            }
        };

        let levels = Levels {
            black: decoded.blacklevels[0] as f32,
            white: decoded.whitelevels[0] as f32,
            wb: white_balance(decoded.wb_coeffs),
            max_out: ((1u32 << bits_per_sample) - 1) as f32,
        };

        Ok(RgbImageData {
            width,
            height,
            data: levels.apply(&rgb),
            bits_per_sample,
        })
    }
}

struct Levels {
    black: f32,
    white: f32,
    wb: [f32; 3],
    max_out: f32,
}

impl Levels {
    fn apply(&self, rgb: &[u16]) -> Vec<u16> {
        let range = (self.white - self.black).max(1.0);
        rgb.chunks_exact(CHANNELS)
            .flat_map(|px| {
                let mut out = [0u16; CHANNELS];
                for c in 0..CHANNELS {
                    let linear = ((px[c] as f32 - self.black).max(0.0) / range) * self.wb[c];
                    out[c] = (linear.clamp(0.0, 1.0) * self.max_out).round() as u16;
                }
                out
            })
            .collect()
    }
}

/// Per-channel multipliers normalized to green; NaN or zero coefficients fall back to 1.
fn white_balance(coeffs: [f32; 4]) -> [f32; 3] {
    let green = coeffs[1];
    if !(green.is_finite() && green > 0.0) {
        return [1.0; 3];
    }
    let norm = |v: f32| {
        let r = v / green;
        if r.is_finite() && r > 0.0 { r } else { 1.0 }
    };
    [norm(coeffs[0]), 1.0, norm(coeffs[2])]
}

fn demosaic_rggb(sensor: &[u16], width: usize, height: usize) -> Result<Vec<u16>> {
    let bayer_bytes: Vec<u8> = sensor.iter().flat_map(|&v| v.to_le_bytes()).collect();
    let mut output_buf = vec![0u8; width * height * CHANNELS * 2];

    {
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
        bayer::run_demosaic(
            &mut Cursor::new(&bayer_bytes[..]),
            BayerDepth::Depth16LE,
            CFA::RGGB,
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| HdrError::FrameLoadFailure(format!("demosaic failed: {:?}", e)))?;
    }

    Ok(output_buf
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect())
}
