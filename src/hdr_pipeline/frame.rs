//! Frame input module
//!
//! Decoding of bracketed exposures into RGB sample grids, exposure metadata
//! extraction, and the `Frame` type the estimation engine consumes.

mod reader;
mod tiff_reader;
mod raw_reader;
mod metadata;
pub mod types;

pub use reader::FrameReader;
pub use tiff_reader::TiffFrameReader;
pub use raw_reader::RawLoaderReader;
pub use metadata::{ExposureMetadataReader, ExifMetadataReader, DEFAULT_SENSITIVITY};
pub use types::{ExposureParams, Frame, RgbImageData};
