use crate::error::MonochromeError;

pub type SubPixel = f32;
pub type LabPixel = [SubPixel; 3];

pub const MIN_CHANNELS: usize = 3;
pub const L_CHANNEL: usize = 0;
pub const A_CHANNEL: usize = 1;
pub const B_CHANNEL: usize = 2;

/// Rectangle of pixels handled by one processing call.
///
/// `x`, `y` and `scale` place the region inside the full image so an input
/// region can be aligned with a differently sized output region (preview
/// scaling). The transforms themselves only look at `width` and `height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
    pub scale: f32,
}

impl Roi {
    pub fn new(width: usize, height: usize) -> Self {
        Roi {
            x: 0,
            y: 0,
            width,
            height,
            scale: 1.0,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn buffer_len(&self, channels: usize) -> usize {
        self.pixel_count() * channels
    }
}

/// Channel layout plus the input and output regions of one call.
///
/// Buffers are row-major and channel-interleaved. Input rows are
/// `roi_in.width * channels` values apart, output rows
/// `roi_out.width * channels`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessRegion {
    pub channels: usize,
    pub roi_in: Roi,
    pub roi_out: Roi,
}

impl ProcessRegion {
    pub fn new(channels: usize, roi_in: Roi, roi_out: Roi) -> Self {
        ProcessRegion {
            channels,
            roi_in,
            roi_out,
        }
    }

    pub fn full(width: usize, height: usize, channels: usize) -> Self {
        let roi = Roi::new(width, height);
        ProcessRegion::new(channels, roi, roi)
    }

    pub fn input_stride(&self) -> usize {
        self.roi_in.width * self.channels
    }

    pub fn output_stride(&self) -> usize {
        self.roi_out.width * self.channels
    }

    pub fn output_len(&self) -> usize {
        self.roi_out.buffer_len(self.channels)
    }

    /// Checks the buffer contract once, before any pixel is touched.
    ///
    /// Rows of the output region are filled from the same rows of the input
    /// region, so the output region must fit inside the input region.
    pub fn validate(&self, input_len: usize, output_len: usize) -> Result<(), MonochromeError> {
        if self.channels < MIN_CHANNELS {
            return Err(MonochromeError::ChannelCount(self.channels));
        }
        if self.roi_out.width == 0 || self.roi_out.height == 0 {
            return Err(MonochromeError::EmptyRegion {
                width: self.roi_out.width,
                height: self.roi_out.height,
            });
        }
        if self.roi_out.width > self.roi_in.width || self.roi_out.height > self.roi_in.height {
            return Err(MonochromeError::RegionMismatch {
                in_width: self.roi_in.width,
                in_height: self.roi_in.height,
                out_width: self.roi_out.width,
                out_height: self.roi_out.height,
            });
        }
        let input_needed = self.roi_in.buffer_len(self.channels);
        if input_len < input_needed {
            return Err(MonochromeError::BufferSize {
                buffer: "input",
                expected: input_needed,
                actual: input_len,
            });
        }
        let output_needed = self.output_len();
        if output_len < output_needed {
            return Err(MonochromeError::BufferSize {
                buffer: "output",
                expected: output_needed,
                actual: output_len,
            });
        }
        Ok(())
    }
}

pub trait PixelOps {
    fn lightness(&self) -> SubPixel;
    fn chroma(&self) -> SubPixel;
}

impl PixelOps for [SubPixel] {
    fn lightness(&self) -> SubPixel {
        self[L_CHANNEL]
    }
    fn chroma(&self) -> SubPixel {
        self[A_CHANNEL].hypot(self[B_CHANNEL])
    }
}

/// A whole image in L*a*b*, owned by the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct LabImage {
    pub data: Vec<SubPixel>,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
}

impl LabImage {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        LabImage {
            data: vec![0.0; width * height * channels],
            width,
            height,
            channels,
        }
    }

    pub fn from_pixels(pixels: &[LabPixel], width: usize, height: usize) -> Self {
        let data = pixels.iter().flatten().copied().collect();
        LabImage {
            data,
            width,
            height,
            channels: MIN_CHANNELS,
        }
    }

    pub fn region(&self) -> ProcessRegion {
        ProcessRegion::full(self.width, self.height, self.channels)
    }

    pub fn pixels(&self) -> std::slice::ChunksExact<'_, SubPixel> {
        self.data.chunks_exact(self.channels)
    }

    pub fn lightness_channel(&self) -> Vec<SubPixel> {
        self.pixels().map(|pixel| pixel.lightness()).collect()
    }

    pub fn max_chroma(&self) -> SubPixel {
        self.pixels().fold(0.0, |current_max, pixel| pixel.chroma().max(current_max))
    }
}
