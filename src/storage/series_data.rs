use serde::{Deserialize, Serialize};
use crate::common::types::{Sample, Timestamp};
use crate::error::{SeriesError, SeriesResult};

/// Parallel timestamp/value arrays, in the order the samples were appended.
/// This is the shape filters transform and the container caches.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub timestamps: Vec<Timestamp>,
    pub values: Vec<f64>,
}

impl SeriesData {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn new_with_data(timestamps: Vec<Timestamp>, values: Vec<f64>) -> Self {
        Self { timestamps, values }
    }

    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Self {
        let (timestamps, values) = samples
            .into_iter()
            .map(|sample| sample.as_tuple())
            .unzip();
        Self { timestamps, values }
    }

    pub fn push(&mut self, ts: Timestamp, value: f64) {
        self.timestamps.push(ts);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Drops trailing entries so both arrays have the same length. Returns the number of
    /// entries removed.
    pub fn truncate_to_shortest(&mut self) -> usize {
        let len = self.timestamps.len().min(self.values.len());
        let removed = self.timestamps.len() + self.values.len() - 2 * len;
        self.timestamps.truncate(len);
        self.values.truncate(len);
        removed
    }

    /// Earliest timestamp. Storage order is not chronological, so this scans.
    pub fn min_timestamp(&self) -> SeriesResult<Timestamp> {
        self.timestamps.iter().min().copied().ok_or(SeriesError::EmptySeries)
    }

    pub fn max_timestamp(&self) -> SeriesResult<Timestamp> {
        self.timestamps.iter().max().copied().ok_or(SeriesError::EmptySeries)
    }

    pub fn min_value(&self) -> SeriesResult<f64> {
        self.values
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or(SeriesError::EmptySeries)
    }

    pub fn max_value(&self) -> SeriesResult<f64> {
        self.values
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or(SeriesError::EmptySeries)
    }

    pub fn iter(&self) -> SeriesDataIter {
        SeriesDataIter::new(self)
    }
}

pub struct SeriesDataIter<'a> {
    series: &'a SeriesData,
    idx: usize,
}

impl<'a> SeriesDataIter<'a> {
    pub fn new(series: &'a SeriesData) -> Self {
        Self { series, idx: 0 }
    }
}

impl Iterator for SeriesDataIter<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = *self.series.timestamps.get(self.idx)?;
        let value = *self.series.values.get(self.idx)?;
        self.idx += 1;
        Some(Sample::new(timestamp, value))
    }
}
