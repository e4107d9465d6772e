//! Multi-exposure HDR reconstruction pipeline
//!
//! This module turns a bracketed set of differently exposed frames into one
//! high dynamic range radiance image. It is split into the frame input side
//! (decoding and exposure metadata), the estimation engine (response curve
//! recovery and radiance merging), TIFF output, and the orchestration that
//! ties them together.

pub mod common;
pub mod config;
pub mod frame;
pub mod engine;
pub mod tiff;
pub mod conversions;

pub use common::{
    HdrError,
    Result,
    PipelineTimings,
    StepTiming,
    Timer,
};

pub use config::{
    HdrConfig,
    HdrConfigBuilder,
};

pub use frame::{
    ExposureParams,
    Frame,
    RgbImageData,
    FrameReader,
    TiffFrameReader,
    RawLoaderReader,
    ExposureMetadataReader,
    ExifMetadataReader,
};

pub use engine::{
    reconstruct,
    reconstruct_bracket,
    EstimatorConfig,
    EstimationOutcome,
    NoopObserver,
    RadianceImage,
    Reconstruction,
    ReconstructionObserver,
    ReconstructionReport,
    ResponseCurve,
    TracingObserver,
    WeightTable,
};

pub use self::tiff::{
    TiffCompression,
    RadianceWriter,
    StandardTiffWriter,
};

pub use conversions::{
    BracketInput,
    BracketToHdrPipeline,
};
