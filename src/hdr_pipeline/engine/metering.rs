//! Exposure metering: turns per-frame exposure settings into brightness
//! coefficients relative to a reference frame of the batch.

use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::frame::ExposureParams;

/// ISO speed constant of the APEX speed value, `Sv = log2(ISO / 3.125)`.
pub const ISO_BASE: f64 = 3.125;

/// Absolute brightness of one exposure, `1 / 2^(Av + Tv - Sv)`.
///
/// Degenerate settings (zero exposure time, zero ISO, ...) come out as zero,
/// NaN or infinity and are rejected by `meter_batch`.
pub fn apex_brightness(params: &ExposureParams) -> f64 {
    let av = 2.0 * params.aperture.log2();
    let tv = (1.0 / params.exposure_time).log2();
    let sv = (params.sensitivity as f64 / ISO_BASE).log2();
    1.0 / (av + tv - sv).exp2()
}

/// Brightness coefficients of a whole batch, normalized so the frame at index
/// `len / 2` is exactly 1.
///
/// Fails with `InvalidExposureMetadata` on the first frame whose coefficient is
/// zero or not finite; nothing is returned for the rest of the batch.
pub fn meter_batch(exposures: &[ExposureParams]) -> Result<Vec<f64>> {
    if exposures.is_empty() {
        return Err(HdrError::EmptyBatch);
    }

    let absolute = exposures
        .iter()
        .enumerate()
        .map(|(index, params)| checked(index, apex_brightness(params), params))
        .collect::<Result<Vec<f64>>>()?;

    let reference = absolute[exposures.len() / 2];
    debug!(reference_index = exposures.len() / 2, reference, "Metered exposure batch");

    absolute
        .iter()
        .zip(exposures)
        .enumerate()
        .map(|(index, (&b, params))| checked(index, b / reference, params))
        .collect()
}

fn checked(index: usize, brightness: f64, params: &ExposureParams) -> Result<f64> {
    if brightness == 0.0 || !brightness.is_finite() {
        return Err(HdrError::InvalidExposureMetadata {
            index,
            reason: format!(
                "brightness {} from exposure_time={}s aperture=f/{} iso={}",
                brightness, params.exposure_time, params.aperture, params.sensitivity
            ),
        });
    }
    Ok(brightness)
}
