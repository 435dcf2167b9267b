use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scale and granularity a tracker uses for scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreFormat {
    #[default]
    #[serde(rename = "POINT_10")]
    Point10,
    #[serde(rename = "POINT_100")]
    Point100,
    /// 0.0–10.0 in 0.1 steps, stored as the integers 0..=100.
    #[serde(rename = "POINT_10_DECIMAL")]
    Point10Decimal,
    /// 1.0–10.0 in 0.1 steps, stored as the decimal itself.
    #[serde(rename = "POINT_10_DECIMAL_ONE_DIGIT")]
    Point10DecimalOneDigit,
    #[serde(rename = "POINT_5")]
    Point5,
    #[serde(rename = "POINT_3")]
    Point3,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("'{input}' is not a valid {format} score")]
    Unparsable { format: ScoreFormat, input: String },

    #[error("score {score} is outside the {format} range")]
    OutOfRange { format: ScoreFormat, score: f64 },

    #[error("tracker scores use {expected}, not {declared}")]
    FormatMismatch {
        expected: ScoreFormat,
        declared: ScoreFormat,
    },
}

impl ScoreFormat {
    pub const ALL: &[ScoreFormat] = &[
        Self::Point10,
        Self::Point100,
        Self::Point10Decimal,
        Self::Point10DecimalOneDigit,
        Self::Point5,
        Self::Point3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point10 => "POINT_10",
            Self::Point100 => "POINT_100",
            Self::Point10Decimal => "POINT_10_DECIMAL",
            Self::Point10DecimalOneDigit => "POINT_10_DECIMAL_ONE_DIGIT",
            Self::Point5 => "POINT_5",
            Self::Point3 => "POINT_3",
        }
    }

    /// Highest score for the integer formats; `None` for the decimal one.
    fn integer_max(self) -> Option<u32> {
        match self {
            Self::Point10 => Some(10),
            Self::Point100 | Self::Point10Decimal => Some(100),
            Self::Point5 => Some(5),
            Self::Point3 => Some(3),
            Self::Point10DecimalOneDigit => None,
        }
    }

    /// Every legal score, in ascending order.
    pub fn options(self) -> Vec<f64> {
        match self.integer_max() {
            Some(max) => (0..=max).map(f64::from).collect(),
            // floor(n / 10) + (n % 10) / 10 + 1 == (n + 10) / 10
            None => (0u32..100)
                .map(|n| f64::from(n + 10) / 10.0)
                .filter(|score| *score <= 10.0)
                .collect(),
        }
    }

    /// Whether `score` belongs to this format's domain.
    pub fn contains(self, score: f64) -> bool {
        if !score.is_finite() {
            return false;
        }
        match self.integer_max() {
            Some(max) => score.fract() == 0.0 && score >= 0.0 && score <= f64::from(max),
            None => {
                let tenths = score * 10.0;
                (tenths - tenths.round()).abs() < 1e-6 && (10.0..=100.0).contains(&tenths.round())
            }
        }
    }

    /// Check a score sent to a tracker whose scores are always in this format.
    pub fn check(self, declared: Option<ScoreFormat>, score: f64) -> Result<(), ScoreError> {
        match declared {
            Some(declared) if declared != self => Err(ScoreError::FormatMismatch {
                expected: self,
                declared,
            }),
            _ if !self.contains(score) => Err(ScoreError::OutOfRange {
                format: self,
                score,
            }),
            _ => Ok(()),
        }
    }

    /// Coerce user input: a decimal for `POINT_10_DECIMAL_ONE_DIGIT`, an integer otherwise.
    pub fn parse(self, input: &str) -> Result<f64, ScoreError> {
        let trimmed = input.trim();
        let unparsable = || ScoreError::Unparsable {
            format: self,
            input: input.to_string(),
        };

        let score = match self.integer_max() {
            Some(_) => f64::from(trimmed.parse::<u32>().map_err(|_| unparsable())?),
            None => {
                let raw: f64 = trimmed.parse().map_err(|_| unparsable())?;
                if !self.contains(raw) {
                    return Err(ScoreError::OutOfRange {
                        format: self,
                        score: raw,
                    });
                }
                // Snap to the tenth so the result is bit-identical to the domain member.
                (raw * 10.0).round() / 10.0
            }
        };

        if self.contains(score) {
            Ok(score)
        } else {
            Err(ScoreError::OutOfRange {
                format: self,
                score,
            })
        }
    }

    /// Display text for a score, accepted back by [`ScoreFormat::parse`].
    pub fn label(self, score: f64) -> String {
        match self {
            Self::Point10DecimalOneDigit => format!("{score:.1}"),
            _ => format!("{}", score.round() as i64),
        }
    }
}

impl std::fmt::Display for ScoreFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown score format: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_sizes() {
        assert_eq!(ScoreFormat::Point10.options().len(), 11);
        assert_eq!(ScoreFormat::Point100.options().len(), 101);
        assert_eq!(ScoreFormat::Point10Decimal.options().len(), 101);
        assert_eq!(ScoreFormat::Point5.options().len(), 6);
        assert_eq!(ScoreFormat::Point3.options().len(), 4);
    }

    #[test]
    fn test_one_digit_domain() {
        let options = ScoreFormat::Point10DecimalOneDigit.options();
        assert_eq!(options.first(), Some(&1.0));
        assert_eq!(options.last(), Some(&10.0));
        assert_eq!(options.len(), 91);
        assert!(options.contains(&7.3));
        assert!(options.windows(2).all(|w| ((w[1] - w[0]) - 0.1).abs() < 1e-9));
    }

    #[test]
    fn test_every_option_is_contained() {
        for format in ScoreFormat::ALL {
            for score in format.options() {
                assert!(format.contains(score), "{format} should contain {score}");
            }
        }
    }

    #[test]
    fn test_parse_one_digit_is_exact() {
        let score = ScoreFormat::Point10DecimalOneDigit.parse("7.3").unwrap();
        assert_eq!(score, 7.3);
        assert_eq!(ScoreFormat::Point10DecimalOneDigit.label(score), "7.3");
        assert_eq!(ScoreFormat::Point10DecimalOneDigit.parse("10").unwrap(), 10.0);
    }

    #[test]
    fn test_parse_rejects_out_of_domain() {
        assert!(matches!(
            ScoreFormat::Point10DecimalOneDigit.parse("0.5"),
            Err(ScoreError::OutOfRange { .. })
        ));
        assert!(matches!(
            ScoreFormat::Point5.parse("6"),
            Err(ScoreError::OutOfRange { .. })
        ));
        assert!(matches!(
            ScoreFormat::Point10.parse("7.5"),
            Err(ScoreError::Unparsable { .. })
        ));
        assert!(ScoreFormat::Point100.parse("-1").is_err());
        assert!(ScoreFormat::Point3.parse("abc").is_err());
    }

    #[test]
    fn test_parse_one_digit_rejects_extra_precision() {
        for input in ["7.35", "9.99", "1.05"] {
            assert!(
                matches!(
                    ScoreFormat::Point10DecimalOneDigit.parse(input),
                    Err(ScoreError::OutOfRange { .. })
                ),
                "{input} should be rejected"
            );
        }
        assert_eq!(
            ScoreFormat::Point10DecimalOneDigit.parse("7.30").unwrap(),
            7.3
        );
    }

    #[test]
    fn test_parse_integer_formats() {
        assert_eq!(ScoreFormat::Point100.parse(" 85 ").unwrap(), 85.0);
        assert_eq!(ScoreFormat::Point10Decimal.parse("73").unwrap(), 73.0);
        assert_eq!(ScoreFormat::Point3.parse("0").unwrap(), 0.0);
    }

    #[test]
    fn test_contains() {
        assert!(ScoreFormat::Point10.contains(10.0));
        assert!(!ScoreFormat::Point10.contains(10.5));
        assert!(!ScoreFormat::Point10DecimalOneDigit.contains(0.0));
        assert!(!ScoreFormat::Point10DecimalOneDigit.contains(7.35));
        assert!(!ScoreFormat::Point100.contains(f64::NAN));
    }

    #[test]
    fn test_check_against_tracker_format() {
        assert!(ScoreFormat::Point10.check(None, 7.0).is_ok());
        assert!(ScoreFormat::Point10.check(Some(ScoreFormat::Point10), 10.0).is_ok());
        assert!(matches!(
            ScoreFormat::Point10.check(Some(ScoreFormat::Point100), 8.0),
            Err(ScoreError::FormatMismatch {
                expected: ScoreFormat::Point10,
                declared: ScoreFormat::Point100,
            })
        ));
        assert!(matches!(
            ScoreFormat::Point10.check(None, 85.0),
            Err(ScoreError::OutOfRange { .. })
        ));
        assert!(ScoreFormat::Point10DecimalOneDigit.check(None, 7.35).is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ScoreFormat::Point10DecimalOneDigit).unwrap();
        assert_eq!(json, "\"POINT_10_DECIMAL_ONE_DIGIT\"");
        let parsed: ScoreFormat = serde_json::from_str("\"POINT_3\"").unwrap();
        assert_eq!(parsed, ScoreFormat::Point3);
    }
}
