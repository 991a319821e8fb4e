use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser as Clap_parser, ValueEnum};
use color::ColorSpaceTag::{Lab, Srgb};
use hkmono::config::{self, PipelineConfig};
use hkmono::helpers::Stats;
use hkmono::params::{MODULE_NAME, PARAMS_VERSION};
use hkmono::pipeline::run_pixel_pipeline;
use hkmono::{LabImage, MonochromeError, MonochromeParams, Operator};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OperatorArg {
    Lightness,
    ApparentGrayscale,
}

#[derive(Clap_parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// image to convert
    #[arg(name = "input path", value_name = "input_path")]
    input_path: String,

    #[arg(
        short,
        name = "output path",
        default_value = "result.png",
        value_name = "output_path"
    )]
    output_path: String,

    /// pipeline config, overrides --operator and --colorcontrast
    #[arg(short, name = "config path", value_name = "config_path")]
    config_path: Option<String>,

    #[arg(long, value_enum, default_value_t = OperatorArg::ApparentGrayscale)]
    operator: OperatorArg,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    colorcontrast: f32,
}

impl Args {
    fn params(&self) -> MonochromeParams {
        let operator = match self.operator {
            OperatorArg::Lightness => Operator::Lightness,
            OperatorArg::ApparentGrayscale => Operator::ApparentGrayscale {
                colorcontrast: self.colorcontrast,
            },
        };
        MonochromeParams::from(operator)
    }
}

fn to_lab(image: &image::Rgb32FImage) -> LabImage {
    let pixels: Vec<[f32; 3]> = image
        .pixels()
        .map(|pixel| Srgb.convert(Lab, pixel.0))
        .collect();
    LabImage::from_pixels(&pixels, image.width() as usize, image.height() as usize)
}

fn to_rgb8(image: &LabImage) -> Option<image::RgbImage> {
    let data = image
        .pixels()
        .flat_map(|pixel| Lab.convert(Srgb, [pixel[0], pixel[1], pixel[2]]))
        .map(|x| (x.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    image::RgbImage::from_vec(image.width as u32, image.height as u32, data)
}

fn run(args: &Args) -> Result<(), MonochromeError> {
    let decode = Instant::now();
    let input = image::open(&args.input_path)?.to_rgb32f();
    info!("decode file: {:.2?}", decode.elapsed());

    let config = match &args.config_path {
        Some(path) => config::load_config(path)?,
        None => {
            let params = args.params();
            params.validate()?;
            PipelineConfig::single(params)
        }
    };

    let now = Instant::now();
    let result = run_pixel_pipeline(to_lab(&input), &config)?;
    info!("pixel pipeline time: {:.2?}", now.elapsed());

    let lightness = result.lightness_channel();
    info!(
        "lightness mean {:.2} sd {:.2} min {:.2} max {:.2}",
        lightness.iter().mean(),
        lightness.iter().sd(),
        Stats::min(lightness.iter()),
        Stats::max(lightness.iter())
    );

    let now = Instant::now();
    match to_rgb8(&result) {
        Some(output) => output.save(&args.output_path)?,
        None => error!("pipeline returned {}x{} pixels, nothing saved", result.width, result.height),
    }
    info!("save: {:.2?}", now.elapsed());
    info!("total time: {:.2?}", decode.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("{MODULE_NAME} v{PARAMS_VERSION}");
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
