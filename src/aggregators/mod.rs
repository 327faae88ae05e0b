mod downsample;
mod histogram;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::SeriesError;
pub use downsample::*;
pub use histogram::*;

/// Per-window reduction used when downsampling.
#[derive(Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    #[default]
    Mean,
    Median,
    Sum,
    /// no windowing, the filtered series is returned as is
    None,
}

impl Aggregator {
    /// Reduces one window. Mean and median of an empty window are NaN, the sum is 0.
    /// `None` has no per-window value and always yields NaN.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Aggregator::Mean => mean(values),
            Aggregator::Median => median(values),
            Aggregator::Sum => values.iter().sum(),
            Aggregator::None => f64::NAN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::Mean => "mean",
            Aggregator::Median => "median",
            Aggregator::Sum => "sum",
            Aggregator::None => "none",
        }
    }
}

impl Display for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Aggregator {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(Aggregator::Mean),
            "median" => Ok(Aggregator::Median),
            "sum" => Ok(Aggregator::Sum),
            "none" => Ok(Aggregator::None),
            _ => Err(SeriesError::InvalidConfiguration(format!(
                "unknown aggregator '{s}'"
            ))),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mean", Aggregator::Mean)]
    #[test_case("AVG", Aggregator::Mean)]
    #[test_case("Median", Aggregator::Median)]
    #[test_case("sum", Aggregator::Sum)]
    #[test_case("none", Aggregator::None)]
    fn test_parse(name: &str, expected: Aggregator) {
        assert_eq!(name.parse::<Aggregator>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "stddev".parse::<Aggregator>(),
            Err(SeriesError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for agg in [Aggregator::Mean, Aggregator::Median, Aggregator::Sum, Aggregator::None] {
            assert_eq!(agg.to_string().parse::<Aggregator>().unwrap(), agg);
        }
    }

    #[test]
    fn test_reduce() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(Aggregator::Mean.reduce(&values), 2.5);
        assert_eq!(Aggregator::Median.reduce(&values), 2.5);
        assert_eq!(Aggregator::Median.reduce(&values[..3]), 3.0);
        assert_eq!(Aggregator::Sum.reduce(&values), 10.0);
    }

    #[test]
    fn test_reduce_empty_window() {
        assert!(Aggregator::Mean.reduce(&[]).is_nan());
        assert!(Aggregator::Median.reduce(&[]).is_nan());
        assert_eq!(Aggregator::Sum.reduce(&[]), 0.0);
    }
}
