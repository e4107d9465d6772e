use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::frame::types::RgbImageData;

/// Decodes one encoded exposure into an interleaved RGB sample grid.
///
/// Implementations report undecodable input and zero-sized images as
/// `HdrError::FrameLoadFailure`.
pub trait FrameReader {
    fn read_frame(&self, data: &[u8]) -> Result<RgbImageData>;
}
