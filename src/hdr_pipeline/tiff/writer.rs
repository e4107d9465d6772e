use std::io::Write;

use crate::hdr_pipeline::common::error::Result;
use crate::hdr_pipeline::engine::RadianceImage;
use crate::hdr_pipeline::tiff::types::TiffCompression;

pub trait RadianceWriter {
    fn write_radiance(
        &self,
        image: &RadianceImage,
        output: &mut dyn Write,
        compression: TiffCompression,
    ) -> Result<()>;
}
