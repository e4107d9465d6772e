use thiserror::Error;

#[derive(Error, Debug)]
pub enum HdrError {
    #[error("Invalid exposure metadata for frame {index}: {reason}")]
    InvalidExposureMetadata { index: usize, reason: String },

    #[error("Failed to load frame: {0}")]
    FrameLoadFailure(String),

    #[error("Unsupported color space: {0}")]
    UnsupportedColorSpace(String),

    #[error("Response curve channel {channel} has no non-zero values")]
    DegenerateCurve { channel: usize },

    #[error("Response curve did not converge after {iterations} iterations (last metric {metric:e})")]
    DidNotConverge { iterations: usize, metric: f64 },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("Sample value {value} out of range for {levels} intensity levels")]
    SampleOutOfRange { value: u16, levels: usize },

    #[error("No frames to reconstruct from")]
    EmptyBatch,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HdrError>;
