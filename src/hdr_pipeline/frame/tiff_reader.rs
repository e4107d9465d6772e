//! Frame reader for 8 and 16-bit RGB(A) TIFF exposures.

use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::reader::FrameReader;
use crate::hdr_pipeline::frame::types::{CHANNELS, RgbImageData};

/// Reads bracketed exposures stored as TIFF files.
///
/// Only RGB and RGBA layouts with 8 or 16 bits per sample are accepted; alpha is
/// dropped. Anything else (grayscale, palette, CMYK, float) is reported as
/// `UnsupportedColorSpace`.
pub struct TiffFrameReader;

impl FrameReader for TiffFrameReader {
    fn read_frame(&self, data: &[u8]) -> Result<RgbImageData> {
        debug!("Decoding TIFF frame, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| HdrError::FrameLoadFailure(e.to_string()))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| HdrError::FrameLoadFailure(e.to_string()))?;
        let (width, height) = (width as usize, height as usize);

        if width == 0 || height == 0 {
            return Err(HdrError::FrameLoadFailure(format!(
                "decoded an empty {}x{} image",
                width, height
            )));
        }

        let color_type = decoder
            .colortype()
            .map_err(|e| HdrError::FrameLoadFailure(e.to_string()))?;

        let (samples_per_pixel, bits_per_sample) = match color_type {
            ColorType::RGB(bits @ (8 | 16)) => (3, bits as u32),
            ColorType::RGBA(bits @ (8 | 16)) => (4, bits as u32),
            other => {
                return Err(HdrError::UnsupportedColorSpace(format!("{:?}", other)));
            }
        };

        debug!(
            "TIFF frame: {}x{}, {:?}",
            width, height, color_type
        );

        let decoded = decoder
            .read_image()
            .map_err(|e| HdrError::FrameLoadFailure(e.to_string()))?;

        let raw: Vec<u16> = match decoded {
            DecodingResult::U8(values) => values.into_iter().map(u16::from).collect(),
            DecodingResult::U16(values) => values,
            _ => {
                return Err(HdrError::UnsupportedColorSpace(format!(
                    "{:?} decoded to an unexpected sample type",
                    color_type
                )));
            }
        };

        if raw.len() < width * height * samples_per_pixel {
            return Err(HdrError::FrameLoadFailure(format!(
                "truncated pixel data: {} samples for {}x{}",
                raw.len(),
                width,
                height
            )));
        }

        let data = if samples_per_pixel == CHANNELS {
            raw
        } else {
            raw.chunks_exact(samples_per_pixel)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect()
        };

        Ok(RgbImageData {
            width,
            height,
            data,
            bits_per_sample,
        })
    }
}
