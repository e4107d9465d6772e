use tracing::{enabled, trace, Level};

use crate::hdr_pipeline::engine::curve::ResponseCurve;
use crate::hdr_pipeline::engine::multires::ScaleReport;
use crate::hdr_pipeline::frame::types::CHANNELS;

/// Diagnostic hooks into a running reconstruction, e.g. for plotting the curve
/// as it is refined. All methods default to doing nothing.
pub trait ReconstructionObserver {
    /// Called after every estimator iteration with its convergence metric.
    fn on_iteration(&mut self, _iteration: usize, _metric: f64) {}

    /// Called once a scale's estimation pass finished, with the refined curve.
    fn on_scale_complete(&mut self, _scale: &ScaleReport, _curve: &ResponseCurve) {}

    /// Called right before the full-resolution merge.
    fn on_final_merge(&mut self, _width: usize, _height: usize) {}
}

pub struct NoopObserver;

impl ReconstructionObserver for NoopObserver {}

/// Dumps the curve of every finished scale, one event per level, at trace level.
pub struct TracingObserver;

impl ReconstructionObserver for TracingObserver {
    fn on_scale_complete(&mut self, scale: &ScaleReport, curve: &ResponseCurve) {
        if !enabled!(Level::TRACE) {
            return;
        }
        for level in 0..curve.levels() {
            let [r, g, b]: [f64; CHANNELS] = std::array::from_fn(|c| curve.channel(c)[level]);
            trace!(scale_target = scale.target, level, r, g, b, "Curve level");
        }
    }
}
