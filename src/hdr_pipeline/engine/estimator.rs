//! Iterative response curve estimation.
//!
//! Each iteration merges the frames with the current curve, then re-fits every
//! level of the curve as the mean exposure (merged radiance times brightness
//! coefficient) observed at that level. The loop stops once the mean squared
//! change of the curve drops below `epsilon`, or gives up after
//! `max_iterations` and keeps the best iterate seen.

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::engine::curve::{fill_holes, ResponseCurve};
use crate::hdr_pipeline::engine::merge::{batch_dimensions, fuse_frames, FusedRadiance};
use crate::hdr_pipeline::engine::observer::ReconstructionObserver;
use crate::hdr_pipeline::engine::weight::WeightTable;
use crate::hdr_pipeline::frame::types::{CHANNELS, Frame};

pub const CONVERGENCE_EPSILON: f64 = 1e-5;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    pub max_iterations: usize,
    pub epsilon: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: CONVERGENCE_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimationOutcome {
    /// The curve change dropped below epsilon after `iterations` iterations.
    Converged { iterations: usize, metric: f64 },
    /// The iteration bound was hit; `metric` belongs to the best curve kept.
    GaveUp { iterations: usize, metric: f64 },
}

impl EstimationOutcome {
    pub fn iterations(&self) -> usize {
        match *self {
            Self::Converged { iterations, .. } | Self::GaveUp { iterations, .. } => iterations,
        }
    }

    pub fn metric(&self) -> f64 {
        match *self {
            Self::Converged { metric, .. } | Self::GaveUp { metric, .. } => metric,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Result of one estimation pass.
#[derive(Debug, Clone)]
pub struct EstimationRun {
    pub outcome: EstimationOutcome,
    /// Convergence metric of every iteration, in order
    pub metrics: Vec<f64>,
}

/// Per-level exposure sums and observation counts for every channel.
///
/// Built fresh for each iteration; parallel workers fill their own set and the
/// partial sets are combined with `merge` before the curve is re-fitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatorSet {
    count: [Vec<u64>; CHANNELS],
    sum: [Vec<f64>; CHANNELS],
}

impl AccumulatorSet {
    pub fn new(levels: usize) -> Self {
        Self {
            count: std::array::from_fn(|_| vec![0; levels]),
            sum: std::array::from_fn(|_| vec![0.0; levels]),
        }
    }

    #[inline]
    pub fn add(&mut self, channel: usize, level: usize, exposure: f64) {
        self.count[channel][level] += 1;
        self.sum[channel][level] += exposure;
    }

    pub fn merge(mut self, other: Self) -> Self {
        for c in 0..CHANNELS {
            for (a, b) in self.count[c].iter_mut().zip(&other.count[c]) {
                *a += b;
            }
            for (a, b) in self.sum[c].iter_mut().zip(&other.sum[c]) {
                *a += b;
            }
        }
        self
    }

    pub fn counts(&self, channel: usize) -> &[u64] {
        &self.count[channel]
    }

    /// Mean exposure per level, 0 for levels never observed.
    pub fn to_curve(&self) -> ResponseCurve {
        ResponseCurve::from_channels(std::array::from_fn(|c| {
            self.sum[c]
                .iter()
                .zip(&self.count[c])
                .map(|(&s, &n)| if n != 0 { s / n as f64 } else { 0.0 })
                .collect()
        }))
    }
}

/// Gathers, for every frame sample, the merged radiance times that frame's
/// brightness coefficient into the sample's level bin.
pub(crate) fn accumulate(frames: &[Frame], fused: &FusedRadiance, levels: usize) -> AccumulatorSet {
    let width = fused.width;

    (0..fused.height)
        .into_par_iter()
        .fold(
            || AccumulatorSet::new(levels),
            |mut acc, y| {
                let fused_row = fused.row(y);
                for frame in frames {
                    let k = frame.brightness();
                    let row = frame.row(y);
                    for x in 0..width {
                        for c in 0..CHANNELS {
                            let level = row[x * CHANNELS + c] as usize;
                            let radiance = fused_row[x * CHANNELS + c];
                            acc.add(c, level, radiance * k);
                        }
                    }
                }
                acc
            },
        )
        .reduce(|| AccumulatorSet::new(levels), AccumulatorSet::merge)
}

/// Refines `curve` in place against one batch of equally sized frames.
///
/// A `GaveUp` outcome is not an error here; the caller decides whether an
/// unconverged curve is acceptable.
pub fn estimate_response(
    frames: &[Frame],
    curve: &mut ResponseCurve,
    weights: &WeightTable,
    config: &EstimatorConfig,
    observer: &mut dyn ReconstructionObserver,
) -> Result<EstimationRun> {
    let levels = curve.levels();
    let (width, height) = batch_dimensions(frames, levels)?;
    debug!(width, height, frames = frames.len(), levels, "Estimating response curve");

    curve.normalize()?;

    let mut metrics = Vec::new();
    let mut best: Option<(f64, ResponseCurve)> = None;

    for iteration in 1..=config.max_iterations {
        let fused = fuse_frames(frames, curve, weights)?;
        let previous = curve.clone();

        let acc = accumulate(frames, &fused, levels);
        let mut next = acc.to_curve();
        next.normalize()?;
        for c in 0..CHANNELS {
            fill_holes(next.channel_mut(c), acc.counts(c));
        }

        let metric = next.mean_squared_change(&previous);
        *curve = next;
        metrics.push(metric);
        observer.on_iteration(iteration, metric);
        trace!(iteration, metric, "Estimator iteration");

        if metric < config.epsilon {
            debug!(iterations = iteration, metric, "Response curve converged");
            return Ok(EstimationRun {
                outcome: EstimationOutcome::Converged {
                    iterations: iteration,
                    metric,
                },
                metrics,
            });
        }

        if best.as_ref().is_none_or(|(m, _)| metric < *m) {
            best = Some((metric, curve.clone()));
        }
    }

    let mut metric = metrics.last().copied().unwrap_or(f64::INFINITY);
    if let Some((best_metric, best_curve)) = best {
        metric = best_metric;
        *curve = best_curve;
    }

    warn!(
        iterations = config.max_iterations,
        metric,
        epsilon = config.epsilon,
        "Response curve did not converge, keeping best iterate"
    );

    Ok(EstimationRun {
        outcome: EstimationOutcome::GaveUp {
            iterations: config.max_iterations,
            metric,
        },
        metrics,
    })
}
