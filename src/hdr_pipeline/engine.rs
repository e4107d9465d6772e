//! Radiance reconstruction engine
//!
//! Recovers the camera response curve from a bracket of exposures and fuses
//! the bracket into one radiance image with it. The curve is refined
//! iteratively on progressively larger downsampled copies of the frames, and
//! only the final merge runs at full resolution.

mod metering;
mod weight;
mod curve;
mod merge;
mod estimator;
mod downsample;
mod multires;
mod observer;


pub use metering::{apex_brightness, meter_batch, ISO_BASE};
pub use weight::{WeightTable, WEIGHT_EPSILON};
pub use curve::{fill_holes, ResponseCurve};
pub use merge::{merge_frames, RadianceImage};
pub use estimator::{
    estimate_response, AccumulatorSet, EstimationOutcome, EstimationRun, EstimatorConfig,
    CONVERGENCE_EPSILON, DEFAULT_MAX_ITERATIONS,
};
pub use downsample::{downsample_to, scaled_size};
pub use multires::{reconstruct, reconstruct_bracket, Reconstruction, ReconstructionReport, ScaleReport};
pub use observer::{NoopObserver, ReconstructionObserver, TracingObserver};
