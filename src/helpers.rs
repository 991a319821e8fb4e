use crate::pixels::SubPixel;

/// Summary statistics over a slice iterator, used for logging and for
/// measuring local contrast.
///
/// `max` and `min` share their names with `Iterator`; call them as
/// `Stats::max(values.iter())`.
pub trait Stats {
    fn mean(self) -> SubPixel;
    fn median(self) -> SubPixel;
    fn sd(self) -> SubPixel;
    fn variance(self) -> SubPixel;
    fn max(self) -> SubPixel;
    fn min(self) -> SubPixel;
}

impl Stats for std::slice::Iter<'_, SubPixel> {
    fn mean(self) -> SubPixel {
        let length = self.len();
        if length == 0 {
            return 0.0;
        }
        let sum: SubPixel = self.sum();
        sum / length as SubPixel
    }

    /// Sample variance, 0 below two values.
    fn variance(self) -> SubPixel {
        let length = self.len();
        if length < 2 {
            return 0.0;
        }
        let mean = self.clone().mean();
        self.map(|v| (mean - v).powi(2)).sum::<SubPixel>() / (length as SubPixel - 1.0)
    }

    fn sd(self) -> SubPixel {
        self.variance().sqrt()
    }

    fn max(self) -> SubPixel {
        self.copied().reduce(SubPixel::max).unwrap_or(0.0)
    }

    fn min(self) -> SubPixel {
        self.copied().reduce(SubPixel::min).unwrap_or(0.0)
    }

    fn median(self) -> SubPixel {
        let mut sorted_values: Vec<SubPixel> = self.copied().collect();
        if sorted_values.is_empty() {
            return 0.0;
        }
        sorted_values.sort_by(SubPixel::total_cmp);
        sorted_values[sorted_values.len() / 2]
    }
}
