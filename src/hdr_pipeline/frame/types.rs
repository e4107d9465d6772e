//! Frame data types

use crate::hdr_pipeline::common::error::{HdrError, Result};

/// Number of color channels carried by every frame.
pub const CHANNELS: usize = 3;

/// Raw exposure settings of one bracketed shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureParams {
    /// Exposure time in seconds
    pub exposure_time: f64,
    /// Aperture as an f-number
    pub aperture: f64,
    /// ISO sensitivity
    pub sensitivity: u32,
}

impl ExposureParams {
    pub fn new(exposure_time: f64, aperture: f64, sensitivity: u32) -> Self {
        Self {
            exposure_time,
            aperture,
            sensitivity,
        }
    }
}

/// Decoded RGB image as produced by a `FrameReader`
#[derive(Debug, Clone)]
pub struct RgbImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u16>,
    /// Significant bits per sample (e.g. 8 for JPEG-like sources, 14 for a RAW sensor)
    pub bits_per_sample: u32,
}

impl RgbImageData {
    /// Rescales every sample from `bits_per_sample` to `bit_depth` significant bits.
    ///
    /// Deeper sources are truncated by a right shift; shallower ones are spread out
    /// with a left shift, leaving unused levels in between.
    pub fn quantize(&self, bit_depth: u32) -> Vec<u16> {
        if self.bits_per_sample > bit_depth {
            let shift = self.bits_per_sample - bit_depth;
            self.data.iter().map(|&v| v >> shift).collect()
        } else if self.bits_per_sample < bit_depth {
            let shift = bit_depth - self.bits_per_sample;
            self.data.iter().map(|&v| v << shift).collect()
        } else {
            self.data.clone()
        }
    }
}

/// One exposure ready for estimation: quantized RGB levels plus the frame's
/// brightness coefficient relative to the batch reference.
///
/// Frames are immutable; downsampled scales are new frames.
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    levels: usize,
    samples: Vec<u16>,
    brightness: f64,
}

impl Frame {
    /// Builds a frame from interleaved RGB levels, each of which must be `< levels`.
    pub fn new(
        width: usize,
        height: usize,
        samples: Vec<u16>,
        levels: usize,
        brightness: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HdrError::InvalidDimensions(width, height));
        }

        if samples.len() != width * height * CHANNELS {
            return Err(HdrError::FrameLoadFailure(format!(
                "expected {} samples for {}x{} RGB, got {}",
                width * height * CHANNELS,
                width,
                height,
                samples.len()
            )));
        }

        if let Some(&value) = samples.iter().find(|&&v| v as usize >= levels) {
            return Err(HdrError::SampleOutOfRange { value, levels });
        }

        if brightness == 0.0 || !brightness.is_finite() {
            return Err(HdrError::InvalidExposureMetadata {
                index: 0,
                reason: format!("brightness coefficient {} is not usable", brightness),
            });
        }

        Ok(Self {
            width,
            height,
            levels,
            samples,
            brightness,
        })
    }

    /// Quantizes a decoded image to `bit_depth` and attaches its brightness coefficient.
    pub fn from_image(image: &RgbImageData, bit_depth: u32, brightness: f64) -> Result<Self> {
        Self::new(
            image.width,
            image.height,
            image.quantize(bit_depth),
            1usize << bit_depth,
            brightness,
        )
    }

    /// Frame derived from an existing one (e.g. a downsampled copy); samples are
    /// trusted to already be in range.
    pub(crate) fn derived(&self, width: usize, height: usize, samples: Vec<u16>) -> Self {
        debug_assert_eq!(samples.len(), width * height * CHANNELS);
        Self {
            width,
            height,
            levels: self.levels,
            samples,
            brightness: self.brightness,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Interleaved RGB samples of row `y`.
    pub fn row(&self, y: usize) -> &[u16] {
        let stride = self.width * CHANNELS;
        &self.samples[y * stride..(y + 1) * stride]
    }
}
