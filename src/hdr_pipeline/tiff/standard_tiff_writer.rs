use std::io::Write;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tracing::debug;

use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::engine::RadianceImage;
use crate::hdr_pipeline::tiff::types::TiffCompression;
use crate::hdr_pipeline::tiff::writer::RadianceWriter;

pub struct StandardTiffWriter;

impl RadianceWriter for StandardTiffWriter {
    fn write_radiance(
        &self,
        image: &RadianceImage,
        output: &mut dyn Write,
        compression: TiffCompression,
    ) -> Result<()> {
        debug!("Encoding radiance TIFF: {}x{}", image.width, image.height);

        if image.width == 0 || image.height == 0 {
            return Err(HdrError::InvalidDimensions(image.width, image.height));
        }

        let compression = match compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| HdrError::EncodeError(e.to_string()))?
            .with_compression(compression);

        encoder
            .write_image::<colortype::RGBA32Float>(
                image.width as u32,
                image.height as u32,
                &image.data,
            )
            .map_err(|e| HdrError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("Radiance TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
