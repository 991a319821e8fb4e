//! Lab to monochrome conversion.
//!
//! Two operators are available. `Lightness` keeps L* and drops the chroma.
//! `ApparentGrayscale` scales L* by the Helmholtz-Kohlrausch factor so
//! saturated colors keep their perceived brightness, then restores the local
//! contrast lost where neighbouring colors of equal brightness met.
//!
//! The per-pixel stages have no dependency between pixels and run row
//! parallel. The local contrast stage needs the whole output region at once;
//! callers that split an image into tiles get independent filtering per tile
//! and may see seams at the tile borders.

use std::time::Instant;

use tracing::debug;

use crate::conditional_paralell::prelude::*;
use crate::error::MonochromeError;
use crate::hk::HkModel;
use crate::local_laplacian::{LocalContrast, LocalContrastParams};
use crate::params::Operator;
use crate::pixels::{PixelOps, ProcessRegion, SubPixel, A_CHANNEL, B_CHANNEL, L_CHANNEL, MIN_CHANNELS};

#[inline]
fn write_gray(output: &mut [SubPixel], input: &[SubPixel], lightness: SubPixel) {
    output[L_CHANNEL] = lightness;
    output[A_CHANNEL] = 0.0;
    output[B_CHANNEL] = 0.0;
    output[MIN_CHANNELS..].copy_from_slice(&input[MIN_CHANNELS..]);
}

#[inline]
pub fn lightness_pixel(input: &[SubPixel], output: &mut [SubPixel]) {
    write_gray(output, input, input.lightness());
}

#[inline]
pub fn apparent_grayscale_pixel(model: &HkModel, input: &[SubPixel], output: &mut [SubPixel]) {
    let lab = [input[L_CHANNEL], input[A_CHANNEL], input[B_CHANNEL]];
    write_gray(output, input, model.lab_factor(lab) * input.lightness());
}

/// Applies `pixel_op` to every pixel of the output region, reading the pixel
/// at the same row and column of the input region.
fn for_each_pixel(
    input: &[SubPixel],
    output: &mut [SubPixel],
    region: &ProcessRegion,
    pixel_op: impl Fn(&[SubPixel], &mut [SubPixel]) + Sync + Send,
) {
    let channels = region.channels;
    let input_stride = region.input_stride();
    let output_stride = region.output_stride();
    let output_len = region.output_len();

    output[..output_len]
        .par_chunks_mut(output_stride)
        .enumerate()
        .for_each(|(y, output_row)| {
            let input_row = &input[y * input_stride..y * input_stride + output_stride];
            for (out_pixel, in_pixel) in output_row
                .chunks_exact_mut(channels)
                .zip(input_row.chunks_exact(channels))
            {
                pixel_op(in_pixel, out_pixel);
            }
        });
}

pub fn process_lightness(
    input: &[SubPixel],
    output: &mut [SubPixel],
    region: &ProcessRegion,
) -> Result<(), MonochromeError> {
    region.validate(input.len(), output.len())?;
    for_each_pixel(input, output, region, lightness_pixel);
    Ok(())
}

pub fn process_apparent_grayscale(
    input: &[SubPixel],
    output: &mut [SubPixel],
    region: &ProcessRegion,
) -> Result<(), MonochromeError> {
    region.validate(input.len(), output.len())?;
    let model = HkModel::new();
    for_each_pixel(input, output, region, |in_pixel, out_pixel| {
        apparent_grayscale_pixel(&model, in_pixel, out_pixel)
    });
    Ok(())
}

/// Runs `operator` over the output region.
///
/// Everything is checked before the first write: on error the output buffer
/// is left as it was.
pub fn process(
    operator: &Operator,
    filter: &impl LocalContrast,
    input: &[SubPixel],
    output: &mut [SubPixel],
    region: &ProcessRegion,
) -> Result<(), MonochromeError> {
    region.validate(input.len(), output.len())?;
    debug!(
        operator = operator.label(),
        width = region.roi_out.width,
        height = region.roi_out.height,
        channels = region.channels,
        "monochrome"
    );
    match *operator {
        Operator::Lightness => process_lightness(input, output, region),
        Operator::ApparentGrayscale { colorcontrast } => {
            let now = Instant::now();
            process_apparent_grayscale(input, output, region)?;
            debug!("grayscale time: {:.2?}", now.elapsed());

            let now = Instant::now();
            filter.apply_in_place(
                &mut output[..region.output_len()],
                region.roi_out.width,
                region.roi_out.height,
                region.channels,
                &LocalContrastParams::with_clarity(colorcontrast),
            )?;
            debug!("local contrast time: {:.2?}", now.elapsed());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_laplacian::LocalLaplacian;
    use crate::params::MonochromeParams;
    use crate::pixels::Roi;

    const SENTINEL: f32 = -12345.0;

    fn colorful(width: usize, height: usize, channels: usize) -> Vec<f32> {
        (0..width * height)
            .flat_map(|idx| {
                let mut pixel = vec![
                    10.0 + (idx % 80) as f32,
                    -60.0 + (idx * 13 % 120) as f32,
                    -50.0 + (idx * 29 % 100) as f32,
                ];
                pixel.resize(channels, idx as f32);
                pixel
            })
            .collect()
    }

    fn apparent(colorcontrast: f32) -> Operator {
        Operator::ApparentGrayscale { colorcontrast }
    }

    #[test]
    fn lightness_copies_l_and_drops_chroma() {
        let input = colorful(5, 4, 3);
        let mut output = vec![SENTINEL; input.len()];
        let region = ProcessRegion::full(5, 4, 3);
        process(&Operator::Lightness, &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
        for (out_pixel, in_pixel) in output.chunks(3).zip(input.chunks(3)) {
            assert_eq!(out_pixel, [in_pixel[0], 0.0, 0.0]);
        }
    }

    #[test]
    fn apparent_grayscale_drops_chroma() {
        let input = colorful(9, 7, 3);
        let mut output = vec![SENTINEL; input.len()];
        let region = ProcessRegion::full(9, 7, 3);
        process(&apparent(2.0), &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
        assert!(output.chunks(3).all(|p| p[1] == 0.0 && p[2] == 0.0 && p[0].is_finite()));
    }

    #[test]
    fn reference_pixel_golden_value() {
        let input = [50.0, 20.0, -10.0];
        let mut output = [0.0; 3];
        let region = ProcessRegion::full(1, 1, 3);
        process(&apparent(0.0), &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
        assert!((output[0] - 52.512_82).abs() < 1e-4, "{}", output[0]);
        assert_eq!(&output[1..], [0.0, 0.0]);
    }

    #[test]
    fn neutral_pixel_keeps_lightness() {
        let model = HkModel::new();
        let input = [50.0, 0.0, 0.0];
        let mut output = [SENTINEL; 3];
        apparent_grayscale_pixel(&model, &input, &mut output);
        assert!((output[0] - 50.0).abs() < 1e-3, "{}", output[0]);
    }

    #[test]
    fn black_pixel_stays_finite() {
        let input = [0.0, 0.0, 0.0, 1.0];
        let mut output = [SENTINEL; 4];
        let region = ProcessRegion::full(1, 1, 4);
        process(&apparent(4.0), &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
        assert!(output.iter().all(|v| v.is_finite()));
        assert!(output[0].abs() < 1e-3);
    }

    #[test]
    fn fourth_channel_passes_through() {
        let input = colorful(6, 3, 4);
        let mut output = vec![SENTINEL; input.len()];
        let region = ProcessRegion::full(6, 3, 4);
        for operator in [Operator::Lightness, apparent(1.0)] {
            process(&operator, &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
            for (out_pixel, in_pixel) in output.chunks(4).zip(input.chunks(4)) {
                assert_eq!(out_pixel[3], in_pixel[3]);
            }
        }
    }

    #[test]
    fn output_region_inside_wider_input() {
        let (in_width, in_height) = (7, 5);
        let (out_width, out_height) = (4, 3);
        let input = colorful(in_width, in_height, 3);
        let mut output = vec![SENTINEL; out_width * out_height * 3];
        let region = ProcessRegion::new(3, Roi::new(in_width, in_height), Roi::new(out_width, out_height));
        process_lightness(&input, &mut output, &region).unwrap();
        for y in 0..out_height {
            for x in 0..out_width {
                let out_idx = (y * out_width + x) * 3;
                let in_idx = (y * in_width + x) * 3;
                assert_eq!(output[out_idx], input[in_idx]);
            }
        }
    }

    #[test]
    fn writes_stay_inside_output_region() {
        let input = colorful(4, 4, 3);
        let region = ProcessRegion::full(4, 4, 3);
        for operator in [Operator::Lightness, apparent(0.0), apparent(4.0), apparent(-1.0)] {
            let mut output = vec![SENTINEL; 48 + 9];
            process(&operator, &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
            assert!(output[48..].iter().all(|v| *v == SENTINEL));
            assert!(output[..48].iter().all(|v| *v != SENTINEL));
        }
    }

    #[test]
    fn unsupported_operator_fails_before_writing() {
        let params = MonochromeParams {
            operator: 2,
            colorcontrast: 0.0,
        };
        assert!(matches!(
            Operator::try_from(&params),
            Err(MonochromeError::UnsupportedOperator(2))
        ));
    }

    #[test]
    fn bad_region_leaves_output_untouched() {
        let input = colorful(2, 2, 3);
        let mut output = vec![SENTINEL; 6];
        let region = ProcessRegion::full(2, 2, 3);
        let result = process(&apparent(1.0), &LocalLaplacian::default(), &input, &mut output, &region);
        assert!(matches!(result, Err(MonochromeError::BufferSize { buffer: "output", .. })));
        assert!(output.iter().all(|v| *v == SENTINEL));
    }

    #[test]
    fn colorcontrast_raises_edge_contrast() {
        use crate::helpers::Stats;

        // gray next to a red of the same L*
        let (width, height) = (32, 32);
        let input: Vec<f32> = (0..width * height)
            .flat_map(|idx| {
                if idx % width < width / 2 {
                    [45.0, 0.0, 0.0]
                } else {
                    [45.0, 40.0, 20.0]
                }
            })
            .collect();
        let region = ProcessRegion::full(width, height, 3);
        let mut previous = 0.0;
        for colorcontrast in [0.0, 1.0, 2.0, 4.0] {
            let mut output = vec![0.0; input.len()];
            process(&apparent(colorcontrast), &LocalLaplacian::default(), &input, &mut output, &region).unwrap();
            let window: Vec<f32> = (12..20).map(|x| output[(16 * width + x) * 3]).collect();
            let sd = window.iter().sd();
            assert!(sd >= previous, "colorcontrast {colorcontrast}: {sd} < {previous}");
            previous = sd;
        }
    }
}
