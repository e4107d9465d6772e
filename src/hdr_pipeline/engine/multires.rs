//! Multi-resolution driver of the reconstruction.
//!
//! The curve is estimated on small downsampled copies of the bracket first and
//! refined on progressively larger ones; each pass seeds the next. The
//! full-resolution frames only take part in the final merge.

use tracing::{debug, info, info_span, warn};

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::timing::{PipelineTimings, Timer};
use crate::hdr_pipeline::config::HdrConfig;
use crate::hdr_pipeline::engine::curve::ResponseCurve;
use crate::hdr_pipeline::engine::downsample::{downsample_to, scaled_size};
use crate::hdr_pipeline::engine::estimator::{estimate_response, EstimationOutcome};
use crate::hdr_pipeline::engine::merge::{batch_dimensions, merge_frames, RadianceImage};
use crate::hdr_pipeline::engine::metering::meter_batch;
use crate::hdr_pipeline::engine::observer::ReconstructionObserver;
use crate::hdr_pipeline::engine::weight::WeightTable;
use crate::hdr_pipeline::frame::types::{ExposureParams, Frame, RgbImageData};

/// How one estimation scale went.
#[derive(Debug, Clone)]
pub struct ScaleReport {
    /// Requested longest side
    pub target: usize,
    /// Size the frames were actually estimated at
    pub width: usize,
    pub height: usize,
    pub outcome: EstimationOutcome,
    /// Convergence metric of each iteration
    pub metrics: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ReconstructionReport {
    pub scales: Vec<ScaleReport>,
    pub timings: PipelineTimings,
}

impl ReconstructionReport {
    pub fn total_iterations(&self) -> usize {
        self.scales.iter().map(|s| s.outcome.iterations()).sum()
    }

    pub fn converged(&self) -> bool {
        self.scales.iter().all(|s| s.outcome.is_converged())
    }
}

/// Output of a reconstruction: the fused image plus the curve and weights that
/// produced it.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub image: RadianceImage,
    pub curve: ResponseCurve,
    pub weights: WeightTable,
    pub report: ReconstructionReport,
}

/// Meters a decoded bracket, quantizes it to the configured bit depth and
/// reconstructs it.
///
/// Exposure metadata is validated for the whole batch before any pixel work.
pub fn reconstruct_bracket(
    bracket: &[(ExposureParams, RgbImageData)],
    config: &HdrConfig,
    observer: &mut dyn ReconstructionObserver,
) -> Result<Reconstruction> {
    config.validate()?;

    let brightness = {
        let _span = info_span!("meter_exposures", frames = bracket.len()).entered();
        let exposures: Vec<ExposureParams> = bracket.iter().map(|(p, _)| *p).collect();
        meter_batch(&exposures)?
    };

    let frames = bracket
        .iter()
        .zip(brightness)
        .map(|((_, image), k)| Frame::from_image(image, config.bit_depth, k))
        .collect::<Result<Vec<Frame>>>()?;

    reconstruct(&frames, config, observer)
}

/// Estimates the response curve over the configured scales and merges the
/// full-resolution `frames` with it.
pub fn reconstruct(
    frames: &[Frame],
    config: &HdrConfig,
    observer: &mut dyn ReconstructionObserver,
) -> Result<Reconstruction> {
    config.validate()?;
    let levels = config.levels();
    let (width, height) = batch_dimensions(frames, levels)?;

    info!(
        frames = frames.len(),
        width,
        height,
        levels,
        scales = ?config.scales,
        "Starting radiance reconstruction"
    );

    let weights = WeightTable::new(levels);
    let mut curve = ResponseCurve::linear(levels);
    let mut report = ReconstructionReport::default();
    let mut last_size = None;

    for &target in &config.scales {
        let size = scaled_size(width, height, target);
        if last_size == Some(size) {
            debug!(longest_side = target, ?size, "Scale resolves to the previous size, skipping");
            continue;
        }
        last_size = Some(size);

        let _span = info_span!("estimate_scale", longest_side = target).entered();
        let timer = Timer::start(format!("estimate_{}", target));
        let scaled: Vec<Frame> = frames.iter().map(|f| downsample_to(f, target)).collect();

        let run = estimate_response(&scaled, &mut curve, &weights, &config.estimator, observer)?;

        let scale = ScaleReport {
            target,
            width: size.0,
            height: size.1,
            outcome: run.outcome,
            metrics: run.metrics,
        };
        observer.on_scale_complete(&scale, &curve);

        match scale.outcome {
            EstimationOutcome::Converged { iterations, metric } => {
                debug!(longest_side = target, iterations, metric, "Scale converged");
            }
            EstimationOutcome::GaveUp { iterations, metric } => {
                if config.fail_on_non_convergence {
                    return Err(HdrError::DidNotConverge { iterations, metric });
                }
                warn!(longest_side = target, iterations, metric, "Continuing with unconverged curve");
            }
        }

        report.timings.record(timer);
        report.scales.push(scale);
    }

    let image = {
        let _span = info_span!("final_merge", width, height).entered();
        let timer = Timer::start("final_merge");
        observer.on_final_merge(width, height);
        let image = merge_frames(frames, &curve, &weights)?;
        report.timings.record(timer);
        image
    };

    info!(
        iterations = report.total_iterations(),
        converged = report.converged(),
        "Radiance reconstruction complete"
    );

    Ok(Reconstruction {
        image,
        curve,
        weights,
        report,
    })
}
