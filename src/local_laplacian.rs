//! Local contrast restoration with a fast local Laplacian filter.
//!
//! The lightness plane is decomposed into a Laplacian pyramid whose detail
//! coefficients are taken from copies of the image remapped through an
//! edge-aware tone curve around a set of reference levels ("gamma buckets").
//! Each pixel picks up the details of the buckets nearest to its own
//! smoothed value, so small variations get boosted while large edges keep
//! their shape.
//!
//! # Tiling
//! The filter draws on every scale of the pyramid, up to the size of the
//! region it is handed. Running it per tile gives each tile its own coarse
//! levels and can leave visible seams at tile borders. Callers should hand
//! it the whole effective output region at once.
//!
//! # Reference
//! Paris, Hasinoff, Kautz (2011), "Local Laplacian Filters";
//! Aubry et al. (2014), "Fast Local Laplacian Filters".

use itertools::izip;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditional_paralell::prelude::*;
use crate::error::MonochromeError;
use crate::pixels::{SubPixel, L_CHANNEL};
use crate::pyramid::{collapse, gaussian_pyramid, laplacian_pyramid, num_levels, Plane};

pub const MAX_LEVELS: usize = 30;
const MIN_GAMMA_BUCKETS: usize = 6;
const MAX_GAMMA_BUCKETS: usize = 64;
const LIGHTNESS_SCALE: SubPixel = 100.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LocalContrastParams {
    /// Size of the detail band, in lightness / 100.
    pub sigma: SubPixel,
    pub shadows: SubPixel,
    pub highlights: SubPixel,
    /// Strength of the detail boost. 0 leaves the image as it is.
    pub clarity: SubPixel,
}

impl LocalContrastParams {
    pub fn with_clarity(clarity: SubPixel) -> Self {
        LocalContrastParams {
            sigma: 0.1,
            shadows: 1.0,
            highlights: 1.0,
            clarity,
        }
    }
}

/// A filter over the lightness channel of an interleaved buffer.
///
/// Only channel 0 is read and written. In place and out of place are
/// separate entry points; the out of place one copies the other channels
/// from `input`.
pub trait LocalContrast: Sync {
    fn apply_in_place(
        &self,
        buffer: &mut [SubPixel],
        width: usize,
        height: usize,
        channels: usize,
        params: &LocalContrastParams,
    ) -> Result<(), MonochromeError>;

    fn apply(
        &self,
        input: &[SubPixel],
        output: &mut [SubPixel],
        width: usize,
        height: usize,
        channels: usize,
        params: &LocalContrastParams,
    ) -> Result<(), MonochromeError> {
        let len = check_buffer("input", input.len(), width, height, channels)?;
        check_buffer("output", output.len(), width, height, channels)?;
        output[..len].copy_from_slice(&input[..len]);
        self.apply_in_place(&mut output[..len], width, height, channels, params)
    }
}

fn check_buffer(
    buffer: &'static str,
    actual: usize,
    width: usize,
    height: usize,
    channels: usize,
) -> Result<usize, MonochromeError> {
    if width == 0 || height == 0 {
        return Err(MonochromeError::EmptyRegion { width, height });
    }
    if channels == 0 {
        return Err(MonochromeError::ChannelCount(channels));
    }
    let expected = width * height * channels;
    if actual < expected {
        return Err(MonochromeError::BufferSize {
            buffer,
            expected,
            actual,
        });
    }
    Ok(expected)
}

/// Edge-aware remapping of `x` around the reference level `gamma`.
///
/// Within `2 * sigma` of `gamma` the curve is a quadratic Bézier blend,
/// beyond that it is linear with slope `shadows` above and `highlights`
/// below. With both gains at 1 and no clarity this is the identity.
pub fn curve(x: SubPixel, gamma: SubPixel, params: &LocalContrastParams) -> SubPixel {
    let sigma = params.sigma;
    let c = x - gamma;
    let (signed_sigma, gain) = if c > 0.0 {
        (sigma, params.shadows)
    } else {
        (-sigma, params.highlights)
    };
    let value = if c.abs() > 2.0 * sigma {
        gamma + signed_sigma + gain * (c - signed_sigma)
    } else {
        let t = (c.abs() / (2.0 * sigma)).clamp(0.0, 1.0);
        let t2 = t * t;
        let mt = 1.0 - t;
        gamma + signed_sigma * 2.0 * mt * t + t2 * (signed_sigma + signed_sigma * gain)
    };
    // midtone local contrast
    value + params.clarity * c * (-c * c / (2.0 * sigma * sigma / 3.0)).exp()
}

/// Tent weight of bucket `k` for a pixel at `value`, saturating at the ends.
#[inline]
fn bucket_weight(value: SubPixel, k: usize, gammas: &[SubPixel]) -> SubPixel {
    let last = gammas.len() - 1;
    if (k == 0 && value <= gammas[0]) || (k == last && value >= gammas[last]) {
        return 1.0;
    }
    let step = 1.0 / gammas.len() as SubPixel;
    (1.0 - (value - gammas[k]).abs() / step).max(0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalLaplacian {
    pub max_levels: usize,
}

impl Default for LocalLaplacian {
    fn default() -> Self {
        LocalLaplacian {
            max_levels: MAX_LEVELS,
        }
    }
}

impl LocalLaplacian {
    /// Bucket spacing stays at or below `sigma / 2`; coarser spacing lets a
    /// higher clarity flatten edges instead of steepening them.
    pub fn gamma_buckets(sigma: SubPixel) -> usize {
        if !(sigma > 0.0) {
            return MAX_GAMMA_BUCKETS;
        }
        let buckets = (2.0 / sigma).ceil();
        if buckets >= MAX_GAMMA_BUCKETS as SubPixel {
            MAX_GAMMA_BUCKETS
        } else {
            (buckets as usize).max(MIN_GAMMA_BUCKETS)
        }
    }

    /// Filters a lightness plane scaled to [0, 1].
    pub fn filter_plane(&self, base: &Plane, params: &LocalContrastParams) -> Plane {
        let levels = num_levels(base.width, base.height, self.max_levels);
        let buckets = Self::gamma_buckets(params.sigma);
        let gammas: Vec<SubPixel> = (0..buckets)
            .map(|k| (k as SubPixel + 0.5) / buckets as SubPixel)
            .collect();
        let step = 1.0 / buckets as SubPixel;

        let gaussian = gaussian_pyramid(base.clone(), levels);
        let (min, max) = base
            .data
            .iter()
            .fold((SubPixel::INFINITY, SubPixel::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });

        let mut details: Vec<Plane> = gaussian[..levels - 1]
            .iter()
            .map(|level| Plane::filled(0.0, level.width, level.height))
            .collect();

        let mut used = 0;
        for (k, gamma) in gammas.iter().enumerate() {
            // blurred levels never leave the range of the base plane
            let lower = if k == 0 { SubPixel::NEG_INFINITY } else { gamma - step };
            let upper = if k == buckets - 1 { SubPixel::INFINITY } else { gamma + step };
            if !(max > lower && min < upper) {
                continue;
            }
            used += 1;

            let remapped = base.map(|x| curve(x, *gamma, params));
            let remapped_details = laplacian_pyramid(&gaussian_pyramid(remapped, levels));
            for (accumulated, detail, level) in izip!(details.iter_mut(), remapped_details.iter(), gaussian.iter()) {
                accumulated
                    .data
                    .par_iter_mut()
                    .zip(detail.data.par_iter())
                    .zip(level.data.par_iter())
                    .for_each(|((acc, d), v)| *acc += bucket_weight(*v, k, &gammas) * d);
            }
        }
        debug!(
            width = base.width,
            height = base.height,
            levels,
            buckets,
            used,
            "local laplacian"
        );

        collapse(gaussian[levels - 1].clone(), &details)
    }
}

impl LocalContrast for LocalLaplacian {
    fn apply_in_place(
        &self,
        buffer: &mut [SubPixel],
        width: usize,
        height: usize,
        channels: usize,
        params: &LocalContrastParams,
    ) -> Result<(), MonochromeError> {
        let len = check_buffer("buffer", buffer.len(), width, height, channels)?;
        let lightness: Vec<SubPixel> = buffer[..len]
            .par_chunks(channels)
            .map(|pixel| pixel[L_CHANNEL] / LIGHTNESS_SCALE)
            .collect();

        let filtered = self.filter_plane(&Plane::new(lightness, width, height), params);

        buffer[..len]
            .par_chunks_mut(channels)
            .zip(filtered.data.par_iter())
            .for_each(|(pixel, value)| pixel[L_CHANNEL] = value * LIGHTNESS_SCALE);
        Ok(())
    }
}
