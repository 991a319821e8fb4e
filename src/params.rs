use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::MonochromeError;
use crate::pixels::SubPixel;

pub const PARAMS_VERSION: u32 = 1;
pub const MODULE_NAME: &str = "modern monochrome";
pub const COLORCONTRAST_RANGE: RangeInclusive<SubPixel> = -1.0..=4.0;
pub const COLORCONTRAST_STEP: SubPixel = 0.1;
pub const COLORCONTRAST_TOOLTIP: &str =
    "restore local contrast lost when color differences collapse to gray";

const LIGHTNESS: i32 = 0;
const APPARENT_GRAYSCALE: i32 = 1;

/// The module stays off until the user turns it on.
pub fn default_enabled() -> bool {
    false
}

/// Persisted module parameters.
///
/// `operator` keeps its integer form here so stored values outside the known
/// set survive loading and fail at processing time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct MonochromeParams {
    pub operator: i32,
    pub colorcontrast: SubPixel,
}

impl Default for MonochromeParams {
    fn default() -> Self {
        MonochromeParams {
            operator: APPARENT_GRAYSCALE,
            colorcontrast: 0.0,
        }
    }
}

impl MonochromeParams {
    /// Range check on `colorcontrast`. The operator is checked when it is
    /// turned into an [`Operator`].
    pub fn validate(&self) -> Result<(), MonochromeError> {
        if !self.colorcontrast.is_finite() || !COLORCONTRAST_RANGE.contains(&self.colorcontrast) {
            return Err(MonochromeError::ColorContrastRange(self.colorcontrast));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operator {
    Lightness,
    ApparentGrayscale { colorcontrast: SubPixel },
}

impl Operator {
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Lightness => "lightness",
            Operator::ApparentGrayscale { .. } => "apparent grayscale",
        }
    }

    /// In the order of their stored values.
    pub fn all_labels() -> [&'static str; 2] {
        [
            Operator::Lightness.label(),
            Operator::ApparentGrayscale { colorcontrast: 0.0 }.label(),
        ]
    }
}

impl TryFrom<&MonochromeParams> for Operator {
    type Error = MonochromeError;

    fn try_from(params: &MonochromeParams) -> Result<Self, Self::Error> {
        match params.operator {
            LIGHTNESS => Ok(Operator::Lightness),
            APPARENT_GRAYSCALE => Ok(Operator::ApparentGrayscale {
                colorcontrast: params.colorcontrast,
            }),
            other => Err(MonochromeError::UnsupportedOperator(other)),
        }
    }
}

impl From<Operator> for MonochromeParams {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Lightness => MonochromeParams {
                operator: LIGHTNESS,
                colorcontrast: 0.0,
            },
            Operator::ApparentGrayscale { colorcontrast } => MonochromeParams {
                operator: APPARENT_GRAYSCALE,
                colorcontrast,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = MonochromeParams::default();
        assert_eq!(params.operator, 1);
        assert_eq!(params.colorcontrast, 0.0);
        assert!(!default_enabled());
        assert_eq!(
            Operator::try_from(&params).unwrap(),
            Operator::ApparentGrayscale { colorcontrast: 0.0 }
        );
    }

    #[test]
    fn operators_from_stored_values() {
        let lightness = MonochromeParams {
            operator: 0,
            colorcontrast: 2.0,
        };
        assert_eq!(Operator::try_from(&lightness).unwrap(), Operator::Lightness);

        let unknown = MonochromeParams {
            operator: 7,
            colorcontrast: 0.0,
        };
        assert!(matches!(
            Operator::try_from(&unknown),
            Err(MonochromeError::UnsupportedOperator(7))
        ));
    }

    #[test]
    fn stored_values_round_trip_through_operator() {
        let params = MonochromeParams {
            operator: 1,
            colorcontrast: 1.5,
        };
        let operator = Operator::try_from(&params).unwrap();
        assert_eq!(MonochromeParams::from(operator), params);
    }

    #[test]
    fn colorcontrast_bounds() {
        for colorcontrast in [-1.0, 0.0, 4.0] {
            let params = MonochromeParams {
                operator: 1,
                colorcontrast,
            };
            assert!(params.validate().is_ok());
        }
        for colorcontrast in [-1.5, 4.1, f32::NAN] {
            let params = MonochromeParams {
                operator: 1,
                colorcontrast,
            };
            assert!(matches!(
                params.validate(),
                Err(MonochromeError::ColorContrastRange(_))
            ));
        }
    }

    #[test]
    fn slider_metadata() {
        let steps = (COLORCONTRAST_RANGE.end() - COLORCONTRAST_RANGE.start()) / COLORCONTRAST_STEP;
        assert!((steps - 50.0).abs() < 1e-3);
        assert_eq!(PARAMS_VERSION, 1);
        assert_eq!(MODULE_NAME, "modern monochrome");
        assert!(!COLORCONTRAST_TOOLTIP.is_empty());
    }

    #[test]
    fn labels() {
        assert_eq!(Operator::all_labels(), ["lightness", "apparent grayscale"]);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let params: MonochromeParams = toml::from_str("colorcontrast = 2.5").unwrap();
        assert_eq!(params.operator, 1);
        assert_eq!(params.colorcontrast, 2.5);
    }
}
