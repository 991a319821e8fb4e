use convolve_image::kernel::SeparableKernel;

use crate::conditional_paralell::prelude::*;
use crate::pixels::SubPixel;

#[derive(Copy, Clone)]
pub(crate) struct B3SplineKernel(SeparableKernel<5>);

impl B3SplineKernel {
    pub(crate) fn new() -> Self {
        Self(SeparableKernel::new([
            1. / 16.,
            1. / 4.,
            3. / 8.,
            1. / 4.,
            1. / 16.,
        ]))
    }

    fn taps(&self) -> [SubPixel; 5] {
        let mut taps = [0.0; 5];
        for (tap, value) in taps.iter_mut().zip(self.0.values().iter()) {
            *tap = *value;
        }
        taps
    }
}

/// Clamp-to-edge sampling.
#[inline]
fn compute_pixel_index(pixel_index: isize, max: usize) -> usize {
    pixel_index.clamp(0, max as isize - 1) as usize
}

/// One sample of a 2x upsampling, the kernel doubled so even and odd
/// positions both sum to one.
#[inline]
fn upsample(
    taps: &[SubPixel; 5],
    position: usize,
    coarse_len: usize,
    sample: impl Fn(usize) -> SubPixel,
) -> SubPixel {
    taps.iter().enumerate().fold(0.0, |acc, (kernel_index, value)| {
        let numerator = position as isize + 2 - kernel_index as isize;
        if numerator.rem_euclid(2) != 0 {
            return acc;
        }
        let coarse_index = compute_pixel_index(numerator.div_euclid(2), coarse_len);
        acc + 2.0 * value * sample(coarse_index)
    })
}

/// Single channel, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Plane {
    pub data: Vec<SubPixel>,
    pub width: usize,
    pub height: usize,
}

impl Plane {
    pub fn new(data: Vec<SubPixel>, width: usize, height: usize) -> Self {
        Plane {
            data,
            width,
            height,
        }
    }

    pub fn filled(value: SubPixel, width: usize, height: usize) -> Self {
        Plane::new(vec![value; width * height], width, height)
    }

    pub fn map(&self, f: impl Fn(SubPixel) -> SubPixel + Sync + Send) -> Plane {
        let data = self.data.par_iter().map(|value| f(*value)).collect();
        Plane::new(data, self.width, self.height)
    }

    fn zip_with(&self, other: &Plane, f: impl Fn(SubPixel, SubPixel) -> SubPixel + Sync + Send) -> Plane {
        let data = self
            .data
            .par_iter()
            .zip(other.data.par_iter())
            .map(|(a, b)| f(*a, *b))
            .collect();
        Plane::new(data, self.width, self.height)
    }

    /// Blur with the B3 spline and drop every other row and column.
    /// Odd sizes round up.
    pub fn reduce(&self) -> Plane {
        let taps = B3SplineKernel::new().taps();
        let (width, height) = (self.width, self.height);
        let coarse_width = width.div_ceil(2);
        let coarse_height = height.div_ceil(2);

        let mut rows = vec![0.0; coarse_width * height];
        rows.par_chunks_mut(coarse_width).enumerate().for_each(|(y, row)| {
            let source = &self.data[y * width..(y + 1) * width];
            for (x, value) in row.iter_mut().enumerate() {
                *value = taps.iter().enumerate().fold(0.0, |acc, (kernel_index, k)| {
                    let source_x = compute_pixel_index(2 * x as isize + kernel_index as isize - 2, width);
                    acc + k * source[source_x]
                });
            }
        });

        let mut data = vec![0.0; coarse_width * coarse_height];
        data.par_chunks_mut(coarse_width).enumerate().for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = taps.iter().enumerate().fold(0.0, |acc, (kernel_index, k)| {
                    let source_y = compute_pixel_index(2 * y as isize + kernel_index as isize - 2, height);
                    acc + k * rows[source_y * coarse_width + x]
                });
            }
        });
        Plane::new(data, coarse_width, coarse_height)
    }

    /// Upsample to `width` x `height`, the size of the next finer level.
    pub fn expand(&self, width: usize, height: usize) -> Plane {
        let taps = B3SplineKernel::new().taps();
        let (coarse_width, coarse_height) = (self.width, self.height);

        let mut rows = vec![0.0; width * coarse_height];
        rows.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            let source = &self.data[y * coarse_width..(y + 1) * coarse_width];
            for (x, value) in row.iter_mut().enumerate() {
                *value = upsample(&taps, x, coarse_width, |i| source[i]);
            }
        });

        let mut data = vec![0.0; width * height];
        data.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = upsample(&taps, y, coarse_height, |j| rows[j * width + x]);
            }
        });
        Plane::new(data, width, height)
    }
}

/// Levels down to the last one whose short side is still at least 2 pixels.
pub fn num_levels(width: usize, height: usize, max_levels: usize) -> usize {
    let shortest = width.min(height).max(1);
    (shortest.ilog2() as usize).clamp(1, max_levels.max(1))
}

pub fn gaussian_pyramid(base: Plane, levels: usize) -> Vec<Plane> {
    let mut pyramid = Vec::with_capacity(levels);
    pyramid.push(base);
    while pyramid.len() < levels {
        let next = pyramid[pyramid.len() - 1].reduce();
        pyramid.push(next);
    }
    pyramid
}

/// Detail planes, one for every level but the coarsest.
pub fn laplacian_pyramid(gaussian: &[Plane]) -> Vec<Plane> {
    gaussian
        .windows(2)
        .map(|pair| {
            let fine = &pair[0];
            let upsampled = pair[1].expand(fine.width, fine.height);
            fine.zip_with(&upsampled, |a, b| a - b)
        })
        .collect()
}

pub fn collapse(coarsest: Plane, details: &[Plane]) -> Plane {
    details.iter().rev().fold(coarsest, |acc, detail| {
        acc.expand(detail.width, detail.height)
            .zip_with(detail, |a, b| a + b)
    })
}
