use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

mod series_data;
mod slice;
pub mod time_series;

use crate::common::types::Timestamp;
use crate::error::SeriesError;
pub use series_data::*;
pub use slice::*;
pub use time_series::SeriesContainer;

/// The kind of reading a container holds. Selects acceptance and filter behavior;
/// unrecognized tags are kept verbatim and get permissive defaults.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DatasetType {
    Heartrate,
    Intensity,
    Steps,
    #[default]
    Activity,
    Timestamp,
    Other(String),
}

impl DatasetType {
    pub fn as_str(&self) -> &str {
        match self {
            DatasetType::Heartrate => "heartrate",
            DatasetType::Intensity => "intensity",
            DatasetType::Steps => "steps",
            DatasetType::Activity => "activity",
            DatasetType::Timestamp => "timestamp",
            DatasetType::Other(tag) => tag.as_str(),
        }
    }
}

impl Display for DatasetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DatasetType::from(s))
    }
}

impl From<&str> for DatasetType {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "heartrate" | "heart_rate" => DatasetType::Heartrate,
            "intensity" => DatasetType::Intensity,
            "steps" => DatasetType::Steps,
            "activity" => DatasetType::Activity,
            "timestamp" => DatasetType::Timestamp,
            _ => DatasetType::Other(s.to_string()),
        }
    }
}

impl From<String> for DatasetType {
    fn from(s: String) -> Self {
        DatasetType::from(s.as_str())
    }
}

impl From<DatasetType> for String {
    fn from(dataset: DatasetType) -> Self {
        dataset.as_str().to_string()
    }
}

/// Selects one of the two parallel arrays of a container's filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKey {
    Timestamps,
    Values,
}

impl TryFrom<&str> for SeriesKey {
    type Error = SeriesError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "timestamps" => Ok(SeriesKey::Timestamps),
            "values" => Ok(SeriesKey::Values),
            _ => Err(SeriesError::InvalidKey(s.to_string())),
        }
    }
}

impl TryFrom<usize> for SeriesKey {
    type Error = SeriesError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(SeriesKey::Timestamps),
            1 => Ok(SeriesKey::Values),
            _ => Err(SeriesError::InvalidKey(n.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesColumn<'a> {
    Timestamps(&'a [Timestamp]),
    Values(&'a [f64]),
}

impl<'a> SeriesColumn<'a> {
    pub fn timestamps(&self) -> Option<&'a [Timestamp]> {
        match self {
            SeriesColumn::Timestamps(ts) => Some(ts),
            SeriesColumn::Values(_) => None,
        }
    }

    pub fn values(&self) -> Option<&'a [f64]> {
        match self {
            SeriesColumn::Values(values) => Some(values),
            SeriesColumn::Timestamps(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesColumn::Timestamps(ts) => ts.len(),
            SeriesColumn::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
