use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::hdr_pipeline::{
    common::error::{HdrError, Result},
    common::timing::{PipelineTimings, Timer},
    config::HdrConfig,
    engine::{reconstruct_bracket, NoopObserver, Reconstruction, ReconstructionObserver},
    frame::{ExifMetadataReader, ExposureMetadataReader, ExposureParams, FrameReader, RgbImageData, TiffFrameReader},
    tiff::{RadianceWriter, StandardTiffWriter},
};

/// One encoded exposure of a bracket.
///
/// When `exposure` is `None` the settings are read from the file's metadata.
#[derive(Debug, Clone, Copy)]
pub struct BracketInput<'a> {
    pub data: &'a [u8],
    pub exposure: Option<ExposureParams>,
}

impl<'a> BracketInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, exposure: None }
    }

    pub fn with_exposure(data: &'a [u8], exposure: ExposureParams) -> Self {
        Self {
            data,
            exposure: Some(exposure),
        }
    }
}

pub struct BracketToHdrPipeline<R: FrameReader, M: ExposureMetadataReader, W: RadianceWriter> {
    reader: R,
    metadata: M,
    writer: W,
    config: HdrConfig,
}

impl BracketToHdrPipeline<TiffFrameReader, ExifMetadataReader, StandardTiffWriter> {
    pub fn new(config: HdrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: TiffFrameReader,
            metadata: ExifMetadataReader,
            writer: StandardTiffWriter,
            config,
        })
    }
}

impl<R: FrameReader, M: ExposureMetadataReader, W: RadianceWriter> BracketToHdrPipeline<R, M, W> {
    pub fn with_custom(reader: R, metadata: M, writer: W, config: HdrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            metadata,
            writer,
            config,
        })
    }

    fn decode(&self, inputs: &[BracketInput<'_>]) -> Result<Vec<(ExposureParams, RgbImageData)>> {
        inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                let _span = tracing::info_span!("decode_frame", index, size = input.data.len()).entered();
                let image = self.reader.read_frame(input.data)?;
                let exposure = match input.exposure {
                    Some(exposure) => exposure,
                    None => self.metadata.read_exposure(input.data, index)?,
                };
                Ok((exposure, image))
            })
            .collect()
    }

    pub fn reconstruct(&self, inputs: &[BracketInput<'_>]) -> Result<Reconstruction> {
        self.reconstruct_observed(inputs, &mut NoopObserver)
    }

    #[instrument(skip_all, fields(frames = inputs.len()))]
    pub fn reconstruct_observed(
        &self,
        inputs: &[BracketInput<'_>],
        observer: &mut dyn ReconstructionObserver,
    ) -> Result<Reconstruction> {
        if inputs.is_empty() {
            return Err(HdrError::EmptyBatch);
        }

        info!("Starting bracket to HDR reconstruction");
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("decode_frames");
        let bracket = self.decode(inputs)?;
        timings.record(timer);

        let mut result = reconstruct_bracket(&bracket, &self.config, observer)?;

        timings.extend(&result.report.timings);
        result.report.timings = timings;
        Ok(result)
    }

    pub fn convert(&self, inputs: &[BracketInput<'_>], output: &mut dyn Write) -> Result<Reconstruction> {
        self.convert_observed(inputs, output, &mut NoopObserver)
    }

    /// Like [`convert`](Self::convert), reporting progress to `observer`.
    #[instrument(skip_all, fields(frames = inputs.len()))]
    pub fn convert_observed(
        &self,
        inputs: &[BracketInput<'_>],
        output: &mut dyn Write,
        observer: &mut dyn ReconstructionObserver,
    ) -> Result<Reconstruction> {
        let mut result = self.reconstruct_observed(inputs, observer)?;

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            let timer = Timer::start("encode_tiff");
            self.writer
                .write_radiance(&result.image, output, self.config.compression)?;
            result.report.timings.record(timer);
        }

        info!(
            width = result.image.width,
            height = result.image.height,
            iterations = result.report.total_iterations(),
            "Reconstruction written"
        );
        Ok(result)
    }

    pub fn convert_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_paths: &[P],
        output_path: Q,
    ) -> Result<Reconstruction> {
        self.convert_files_observed(input_paths, output_path, &mut NoopObserver)
    }

    #[instrument(skip_all)]
    pub fn convert_files_observed<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_paths: &[P],
        output_path: Q,
        observer: &mut dyn ReconstructionObserver,
    ) -> Result<Reconstruction> {
        let output_path = output_path.as_ref();

        info!(
            inputs = input_paths.len(),
            output = %output_path.display(),
            "Converting bracket"
        );

        let contents = {
            let _span = tracing::info_span!("read_input_files").entered();
            input_paths
                .iter()
                .map(|p| {
                    let p = p.as_ref();
                    std::fs::read(p).map_err(|e| {
                        HdrError::InputReadError(format!("{}: {}", p.display(), e))
                    })
                })
                .collect::<Result<Vec<Vec<u8>>>>()?
        };

        let inputs: Vec<BracketInput<'_>> = contents.iter().map(|d| BracketInput::new(d)).collect();

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| {
                HdrError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        self.convert_observed(&inputs, &mut output_file, observer)
    }

    pub fn config(&self) -> &HdrConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HdrConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}
