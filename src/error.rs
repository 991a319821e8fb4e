use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonochromeError {
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(i32),

    #[error("pixel buffers need at least 3 channels, got {0}")]
    ChannelCount(usize),

    #[error("empty region: {width}x{height}")]
    EmptyRegion { width: usize, height: usize },

    #[error("output region {out_width}x{out_height} does not fit input region {in_width}x{in_height}")]
    RegionMismatch {
        in_width: usize,
        in_height: usize,
        out_width: usize,
        out_height: usize,
    },

    #[error("{buffer} buffer holds {actual} values, region needs {expected}")]
    BufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("color contrast {0} outside [-1, 4]")]
    ColorContrastRange(f32),

    #[error("wrong pipeline module name: {0}")]
    UnknownModule(String),

    #[error("pipeline module without a name")]
    MissingModuleName,

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
