//! Common utilities module
//!
//! This module contains shared utilities used across the HDR pipeline.

pub mod error;
pub mod timing;

pub use error::{HdrError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
