use std::time::Instant;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::MonochromeError;
use crate::pixels::LabImage;

/// Runs every enabled module in order, each on the previous module's result.
pub fn run_pixel_pipeline(
    image: LabImage,
    pixel_pipeline: &PipelineConfig,
) -> Result<LabImage, MonochromeError> {
    let mut pipeline_image = image;
    for module in &pixel_pipeline.pipeline_modules {
        if !module.is_enabled() {
            info!("{:} disabled, skipped", module.get_name());
            continue;
        }
        let now = Instant::now();

        pipeline_image = module.process(&pipeline_image)?;

        info!("{:} execution time: {:.2?}", module.get_name(), now.elapsed());
    }
    Ok(pipeline_image)
}
