#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};

    use crate::hdr_pipeline::common::error::{HdrError, Result};
    use crate::hdr_pipeline::config::HdrConfig;
    use crate::hdr_pipeline::conversions::{BracketInput, BracketToHdrPipeline};
    use crate::hdr_pipeline::engine::{RadianceImage, ReconstructionObserver, ResponseCurve, ScaleReport};
    use crate::hdr_pipeline::frame::{ExposureMetadataReader, ExposureParams, FrameReader, RgbImageData};
    use crate::hdr_pipeline::tiff::{RadianceWriter, TiffCompression};

    /// Decodes the first input byte as a brightness multiplier for a fixed 4x4 scene.
    struct MockReader {
        should_fail: bool,
        size: (usize, usize),
    }

    impl FrameReader for MockReader {
        fn read_frame(&self, data: &[u8]) -> Result<RgbImageData> {
            if self.should_fail {
                return Err(HdrError::FrameLoadFailure("Mock decode error".to_string()));
            }
            let gain = data.first().copied().unwrap_or(1) as usize;
            let (width, height) = self.size;
            let data = (0..width * height)
                .flat_map(|i| {
                    let v = ((10 + i % 50) * gain / 4).min(255) as u16;
                    [v, v, v]
                })
                .collect();
            Ok(RgbImageData {
                width,
                height,
                data,
                bits_per_sample: 8,
            })
        }
    }

    /// Exposure time taken from the first input byte; zero means a broken file.
    struct MockMetadata;

    impl ExposureMetadataReader for MockMetadata {
        fn read_exposure(&self, data: &[u8], _index: usize) -> Result<ExposureParams> {
            let time = data.first().copied().unwrap_or(0) as f64 / 4.0;
            Ok(ExposureParams::new(time, 2.0, 100))
        }
    }

    struct MockWriter {
        should_fail: bool,
        written: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl RadianceWriter for MockWriter {
        fn write_radiance(
            &self,
            image: &RadianceImage,
            _output: &mut dyn Write,
            _compression: TiffCompression,
        ) -> Result<()> {
            if self.should_fail {
                return Err(HdrError::EncodeError("Mock encode error".to_string()));
            }
            self.written.lock().unwrap().push((image.width, image.height));
            Ok(())
        }
    }

    fn pipeline(
        reader_fails: bool,
        writer_fails: bool,
        config: HdrConfig,
    ) -> (BracketToHdrPipeline<MockReader, MockMetadata, MockWriter>, Arc<Mutex<Vec<(usize, usize)>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let pipeline = BracketToHdrPipeline::with_custom(
            MockReader {
                should_fail: reader_fails,
                size: (4, 4),
            },
            MockMetadata,
            MockWriter {
                should_fail: writer_fails,
                written: written.clone(),
            },
            config,
        )
        .unwrap();
        (pipeline, written)
    }

    const BRACKET: [&[u8]; 3] = [&[1], &[4], &[16]];

    fn inputs() -> Vec<BracketInput<'static>> {
        BRACKET.iter().map(|&d| BracketInput::new(d)).collect()
    }

    #[test]
    fn test_successful_conversion() {
        let (pipeline, written) = pipeline(false, false, HdrConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(&inputs(), &mut output).unwrap();

        assert_eq!(*written.lock().unwrap(), vec![(4, 4)]);
        assert_eq!((result.image.width, result.image.height), (4, 4));
        assert!(result.report.timings.get_step("decode_frames").is_some());
        assert!(result.report.timings.get_step("final_merge").is_some());
        assert!(result.report.timings.get_step("encode_tiff").is_some());
    }

    #[derive(Default)]
    struct CountingObserver {
        iterations: usize,
        scales: usize,
        final_merges: usize,
    }

    impl ReconstructionObserver for CountingObserver {
        fn on_iteration(&mut self, _iteration: usize, _metric: f64) {
            self.iterations += 1;
        }

        fn on_scale_complete(&mut self, _scale: &ScaleReport, _curve: &ResponseCurve) {
            self.scales += 1;
        }

        fn on_final_merge(&mut self, _width: usize, _height: usize) {
            self.final_merges += 1;
        }
    }

    #[test]
    fn test_convert_observed_reports_progress() {
        let (pipeline, written) = pipeline(false, false, HdrConfig::default());
        let mut observer = CountingObserver::default();

        let mut output = Cursor::new(Vec::new());
        let result = pipeline
            .convert_observed(&inputs(), &mut output, &mut observer)
            .unwrap();

        assert_eq!(observer.iterations, result.report.total_iterations());
        assert_eq!(observer.scales, result.report.scales.len());
        assert_eq!(observer.final_merges, 1);
        assert_eq!(*written.lock().unwrap(), vec![(4, 4)]);
    }

    #[test]
    fn test_reader_failure() {
        let (pipeline, written) = pipeline(true, false, HdrConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(&inputs(), &mut output);

        assert!(matches!(result, Err(HdrError::FrameLoadFailure(_))));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_writer_failure() {
        let (pipeline, _) = pipeline(false, true, HdrConfig::default());

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(&inputs(), &mut output);

        assert!(matches!(result, Err(HdrError::EncodeError(_))));
    }

    #[test]
    fn test_broken_metadata_rejected() {
        let (pipeline, written) = pipeline(false, false, HdrConfig::default());
        let bracket: [&[u8]; 3] = [&[1], &[0], &[16]];
        let inputs: Vec<BracketInput<'_>> = bracket.iter().map(|&d| BracketInput::new(d)).collect();

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(&inputs, &mut output);

        assert!(matches!(
            result,
            Err(HdrError::InvalidExposureMetadata { index: 1, .. })
        ));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_explicit_exposure_overrides_metadata() {
        let (pipeline, _) = pipeline(false, false, HdrConfig::default());
        let inputs = vec![
            BracketInput::with_exposure(&[1], ExposureParams::new(0.25, 2.0, 100)),
            BracketInput::with_exposure(&[0], ExposureParams::new(1.0, 2.0, 100)),
            BracketInput::with_exposure(&[16], ExposureParams::new(4.0, 2.0, 100)),
        ];

        assert!(pipeline.reconstruct(&inputs).is_ok());
    }

    #[test]
    fn test_empty_bracket() {
        let (pipeline, _) = pipeline(false, false, HdrConfig::default());
        let result = pipeline.reconstruct(&[]);
        assert!(matches!(result, Err(HdrError::EmptyBatch)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let result = BracketToHdrPipeline::with_custom(
            MockReader {
                should_fail: false,
                size: (4, 4),
            },
            MockMetadata,
            MockWriter {
                should_fail: false,
                written,
            },
            HdrConfig::builder().bit_depth(0).build(),
        );
        assert!(matches!(result, Err(HdrError::InvalidConfig(_))));
    }

    #[test]
    fn test_dimension_validation_zero_size() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let pipeline = BracketToHdrPipeline::with_custom(
            MockReader {
                should_fail: false,
                size: (0, 4),
            },
            MockMetadata,
            MockWriter {
                should_fail: false,
                written,
            },
            HdrConfig::default(),
        )
        .unwrap();

        let result = pipeline.reconstruct(&inputs());
        assert!(matches!(result, Err(HdrError::InvalidDimensions(0, 4))));
    }

    /// Decodes the brightest exposure one row short.
    struct UnevenReader;

    impl FrameReader for UnevenReader {
        fn read_frame(&self, data: &[u8]) -> Result<RgbImageData> {
            let height = if data.first() == Some(&16) { 3 } else { 4 };
            MockReader {
                should_fail: false,
                size: (4, height),
            }
            .read_frame(data)
        }
    }

    #[test]
    fn test_mismatched_frame_sizes_always_rejected() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let pipeline = BracketToHdrPipeline::with_custom(
            UnevenReader,
            MockMetadata,
            MockWriter {
                should_fail: false,
                written: written.clone(),
            },
            HdrConfig::default(),
        )
        .unwrap();

        let mut output = Cursor::new(Vec::new());
        let result = pipeline.convert(&inputs(), &mut output);

        assert!(matches!(
            result,
            Err(HdrError::DimensionMismatch {
                index: 2,
                width: 4,
                height: 3,
                expected_width: 4,
                expected_height: 4,
            })
        ));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_convert_files_roundtrip() {
        use tiff::decoder::{Decoder, DecodingResult};
        use tiff::encoder::{colortype, TiffEncoder};

        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, gain) in [1u16, 4, 16].iter().enumerate() {
            let data: Vec<u8> = (0..16u16)
                .flat_map(|p| {
                    let v = ((10 + p) * gain / 4).min(255) as u8;
                    [v, v, v]
                })
                .collect();
            let path = dir.path().join(format!("frame_{}.tiff", i));
            let file = std::fs::File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(file).unwrap();
            encoder.write_image::<colortype::RGB8>(4, 4, &data).unwrap();
            paths.push(path);
        }

        // The fixture TIFFs carry no EXIF, so the default pipeline must refuse them.
        let output = dir.path().join("out.tiff");
        let default_pipeline = BracketToHdrPipeline::new(HdrConfig::default()).unwrap();
        let result = default_pipeline.convert_files(&paths, &output);
        assert!(matches!(
            result,
            Err(HdrError::InvalidExposureMetadata { index: 0, .. })
        ));

        let file_pipeline = BracketToHdrPipeline::with_custom(
            crate::hdr_pipeline::frame::TiffFrameReader,
            FileNameMetadata(paths.len()),
            crate::hdr_pipeline::tiff::StandardTiffWriter,
            HdrConfig::builder().compression(TiffCompression::Lzw).build(),
        )
        .unwrap();

        let result = file_pipeline.convert_files(&paths, &output).unwrap();
        assert_eq!((result.image.width, result.image.height), (4, 4));

        let mut decoder = Decoder::new(std::fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (4, 4));
        match decoder.read_image().unwrap() {
            DecodingResult::F32(values) => assert_eq!(values, result.image.data),
            _ => panic!("expected float samples"),
        }
    }

    /// Exposure times 1/4, 1, 4 s by position in the bracket.
    struct FileNameMetadata(usize);

    impl ExposureMetadataReader for FileNameMetadata {
        fn read_exposure(&self, _data: &[u8], index: usize) -> Result<ExposureParams> {
            assert!(index < self.0);
            Ok(ExposureParams::new(0.25 * 4f64.powi(index as i32), 2.0, 100))
        }
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = BracketToHdrPipeline::new(HdrConfig::default()).unwrap();
        let missing = dir.path().join("missing.tiff");

        let result = pipeline.convert_files(&[missing], dir.path().join("out.tiff"));
        assert!(matches!(result, Err(HdrError::InputReadError(_))));
    }
}
