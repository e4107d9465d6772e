//! TIFF output module
//!
//! Writes reconstructed radiance as 32-bit float RGBA TIFF with selectable compression.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::RadianceWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::TiffCompression;
