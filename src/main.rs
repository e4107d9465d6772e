use hdr_radiance_rs::hdr_pipeline::{BracketToHdrPipeline, HdrConfig, TiffCompression, TracingObserver};
use hdr_radiance_rs::logger;

use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((output, inputs)) = args.split_first().filter(|(_, inputs)| !inputs.is_empty()) else {
        anyhow::bail!("usage: hdr_radiance <output.tiff> <exposure.tiff>...");
    };

    info!("Starting hdr_radiance...");

    let config = HdrConfig::builder()
        .compression(TiffCompression::DeflateBalanced)
        .build();
    let pipeline = BracketToHdrPipeline::new(config)?;

    info!("Bracket to HDR pipeline initialized");
    info!("Bit depth: {}", pipeline.config().bit_depth);
    info!("Scales: {:?}", pipeline.config().scales);

    match pipeline.convert_files_observed(inputs, output, &mut TracingObserver) {
        Ok(result) => {
            info!(
                "Reconstruction successful! {} iterations, {}",
                result.report.total_iterations(),
                if result.report.converged() {
                    "converged"
                } else {
                    "not converged"
                }
            );
            result.report.timings.log_summary();
        }
        Err(e) => {
            error!("Reconstruction failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
