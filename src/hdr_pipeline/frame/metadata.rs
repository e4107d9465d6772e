//! Exposure metadata extraction.

use std::io::Cursor;

use exif::{Exif, In, Tag, Value};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::types::ExposureParams;

/// ISO speed assumed when a file does not record one.
pub const DEFAULT_SENSITIVITY: u32 = 100;

/// Extracts exposure settings from an encoded exposure.
///
/// `index` is the frame's position in the batch and is only used for error reporting.
pub trait ExposureMetadataReader {
    fn read_exposure(&self, data: &[u8], index: usize) -> Result<ExposureParams>;
}

/// Reads exposure time, aperture and ISO from EXIF tags.
///
/// The aperture is taken from the APEX `ApertureValue` tag (f-number `2^(v/2)`),
/// falling back to `FNumber` when that is absent.
pub struct ExifMetadataReader;

impl ExposureMetadataReader for ExifMetadataReader {
    fn read_exposure(&self, data: &[u8], index: usize) -> Result<ExposureParams> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(data))
            .map_err(|e| HdrError::InvalidExposureMetadata {
                index,
                reason: format!("no readable EXIF data: {}", e),
            })?;

        let exposure_time = rational(&exif, Tag::ExposureTime).ok_or_else(|| {
            HdrError::InvalidExposureMetadata {
                index,
                reason: "missing ExposureTime".to_string(),
            }
        })?;

        let aperture = rational(&exif, Tag::ApertureValue)
            .map(apex_to_f_number)
            .or_else(|| rational(&exif, Tag::FNumber))
            .ok_or_else(|| HdrError::InvalidExposureMetadata {
                index,
                reason: "missing ApertureValue and FNumber".to_string(),
            })?;

        let sensitivity = exif
            .get_field(Tag::PhotographicSensitivity, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
            .unwrap_or(DEFAULT_SENSITIVITY);

        debug!(
            index,
            exposure_time, aperture, sensitivity, "Read exposure metadata"
        );

        Ok(ExposureParams {
            exposure_time,
            aperture,
            sensitivity,
        })
    }
}

fn rational(exif: &Exif, tag: Tag) -> Option<f64> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref v) => v.first().map(|r| r.to_f64()),
        Value::SRational(ref v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

/// Converts an APEX aperture value `Av` to an f-number, `N = 2^(Av/2)`.
pub(crate) fn apex_to_f_number(value: f64) -> f64 {
    (value / 2.0).exp2()
}
