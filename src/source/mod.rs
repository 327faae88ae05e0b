//! Boundary to whatever stores the raw device exports.
//!
//! A [`DeviceMapping`] names the table and columns a device writes each dataset to and can
//! render the matching `SELECT`. A [`SampleSource`] hands back `(unix seconds, value)` rows,
//! which [`retrieve_dataset`] turns into a container. Executing SQL is left to the caller's
//! source implementation.

use ahash::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::time::from_unix_seconds;
use crate::common::types::RawRow;
use crate::config::Settings;
use crate::error::{SeriesError, SeriesResult};
use crate::storage::{DatasetType, SeriesContainer, TimeRange};

pub const MI_BAND: &str = "MI_BAND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMapping {
    pub table: String,
    pub timestamp_col: String,
    /// Dataset tag to column name.
    pub columns: BTreeMap<String, String>,
}

impl DeviceMapping {
    pub fn mi_band() -> Self {
        let columns = [
            (DatasetType::Heartrate, "HEART_RATE"),
            (DatasetType::Activity, "RAW_KIND"),
            (DatasetType::Intensity, "RAW_INTENSITY"),
            (DatasetType::Steps, "STEPS"),
        ]
        .into_iter()
        .map(|(dataset, col)| (dataset.to_string(), col.to_string()))
        .collect();

        DeviceMapping {
            table: "MI_BAND_ACTIVITY_SAMPLE".to_string(),
            timestamp_col: "TIMESTAMP".to_string(),
            columns,
        }
    }

    /// Built-in mapping for a device name. `MI_BAND` also matches `mi band` and `Mi-Band`.
    pub fn for_device(name: &str) -> SeriesResult<Self> {
        let key = name.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match key.as_str() {
            MI_BAND => Ok(Self::mi_band()),
            _ => Err(SeriesError::InvalidConfiguration(format!(
                "no table mapping for device '{name}'"
            ))),
        }
    }

    pub fn from_json(json: &str) -> SeriesResult<Self> {
        serde_json::from_str(json).map_err(|e| SeriesError::Serialization(e.to_string()))
    }

    /// Datasets this device stores, in tag order.
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn column(&self, dataset: &DatasetType) -> SeriesResult<&str> {
        self.columns
            .get(dataset.as_str())
            .map(|col| col.as_str())
            .ok_or_else(|| SeriesError::UnknownDataset(dataset.to_string()))
    }

    /// `SELECT <ts>, <col> FROM <table>;`, with a half-open `WHERE` on unix seconds when a
    /// range is given.
    pub fn query_for(&self, dataset: &DatasetType, range: Option<&TimeRange>) -> SeriesResult<String> {
        let column = self.column(dataset)?;
        let mut query = format!("SELECT {}, {} FROM {}", self.timestamp_col, column, self.table);
        if let Some(range) = range {
            query.push_str(&format!(
                " WHERE {ts} >= {} AND {ts} < {}",
                range.start.timestamp(),
                range.end.timestamp(),
                ts = self.timestamp_col
            ));
        }
        query.push(';');
        Ok(query)
    }
}

impl Default for DeviceMapping {
    fn default() -> Self {
        Self::mi_band()
    }
}

/// Anything that can produce raw rows for a dataset, in storage order.
pub trait SampleSource {
    fn mapping(&self) -> &DeviceMapping;

    fn fetch(&mut self, dataset: &DatasetType, range: Option<&TimeRange>) -> SeriesResult<Vec<RawRow>>;
}

/// In-memory source. Rows are kept per dataset tag in insertion order.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    mapping: DeviceMapping,
    rows: HashMap<String, Vec<RawRow>>,
}

impl VecSource {
    pub fn new(mapping: DeviceMapping) -> Self {
        Self {
            mapping,
            rows: HashMap::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> SeriesResult<Self> {
        Ok(Self::new(DeviceMapping::for_device(&settings.device)?))
    }

    pub fn insert(&mut self, dataset: &DatasetType, rows: impl IntoIterator<Item = RawRow>) {
        self.rows
            .entry(dataset.as_str().to_string())
            .or_default()
            .extend(rows);
    }
}

impl SampleSource for VecSource {
    fn mapping(&self) -> &DeviceMapping {
        &self.mapping
    }

    fn fetch(&mut self, dataset: &DatasetType, range: Option<&TimeRange>) -> SeriesResult<Vec<RawRow>> {
        let query = self.mapping.query_for(dataset, range)?;
        tracing::debug!(%query, "fetching rows");
        let bounds = range.map(|r| (r.start.timestamp(), r.end.timestamp()));
        let rows = self
            .rows
            .get(dataset.as_str())
            .map(|rows| {
                rows.iter()
                    .filter(|(secs, _)| match bounds {
                        Some((start, end)) => start <= *secs && *secs < end,
                        None => true,
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}

/// Pulls a whole dataset into a new container configured from `settings`.
pub fn retrieve_dataset<S: SampleSource>(
    source: &mut S,
    dataset: impl Into<DatasetType>,
    settings: &Settings,
) -> SeriesResult<SeriesContainer> {
    retrieve_range(source, dataset, None, settings)
}

/// Like [`retrieve_dataset`] but limited to rows in `range` (half-open).
pub fn retrieve_range<S: SampleSource>(
    source: &mut S,
    dataset: impl Into<DatasetType>,
    range: Option<&TimeRange>,
    settings: &Settings,
) -> SeriesResult<SeriesContainer> {
    let dataset = dataset.into();
    let rows = source.fetch(&dataset, range)?;
    let mut container = SeriesContainer::from_settings(dataset, settings)?;
    let total = rows.len();
    for (secs, value) in rows {
        container.append(from_unix_seconds(secs)?, value);
    }
    tracing::debug!(
        dataset = %container.dataset_type(),
        fetched = total,
        stored = container.len(),
        "retrieved dataset"
    );
    Ok(container)
}
