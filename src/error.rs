use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
/// Enum for the failures a series container can surface.
pub enum SeriesError {
  #[error("Invalid key '{0}'. Expected 'timestamps', 'values', 0 or 1.")]
  InvalidKey(String),

  #[error("Time resolution too small. Minimum is 1 min, received {0}.")]
  ResolutionTooSmall(Duration),

  #[error("Series is empty.")]
  EmptySeries,

  #[error("Unknown filter '{0}'.")]
  UnknownFilter(String),

  #[error("Invalid histogram range. min {min}, max {max}, bin width {bin_width}.")]
  InvalidHistogramRange { min: f64, max: f64, bin_width: f64 },

  #[error("Dataset '{0}' not available for this device.")]
  UnknownDataset(String),

  #[error("Invalid timestamp. {0}")]
  InvalidTimestamp(String),

  #[error("Invalid duration. {0}")]
  InvalidDuration(String),

  #[error("Invalid configuration. {0}")]
  InvalidConfiguration(String),

  #[error("Serialization error. {0}")]
  Serialization(String),
}

pub type SeriesResult<T> = Result<T, SeriesError>;
