use chrono::Duration;

use super::Aggregator;
use crate::chart::LineChart;
use crate::common::types::{Sample, Timestamp};
use crate::error::SeriesResult;
use crate::storage::SeriesContainer;

/// Walks `[cur, cur + resolution)` windows from the first filtered timestamp, advancing by
/// the resolution while `cur <= end`. When the last timestamp sits exactly on a window
/// boundary the final window holds only that sample.
///
/// Each window holds what `time_slice(cur, cur + resolution)` would: the filtered samples in
/// range that pass the container's acceptance rule. Samples are sorted once up front and
/// every window is cut off with a binary search, so a full walk costs one sort.
pub struct WindowIter {
    timestamps: Vec<Timestamp>,
    values: Vec<f64>,
    pos: usize,
    cur: Timestamp,
    end: Timestamp,
    resolution: Duration,
    done: bool,
}

impl WindowIter {
    pub fn new(container: &SeriesContainer) -> SeriesResult<Self> {
        let range = container.timerange()?;
        let acceptance = container.acceptance();
        let mut samples: Vec<Sample> = container
            .data()
            .iter()
            .filter(|sample| acceptance.accepts(sample))
            .collect();
        samples.sort_by_key(|sample| sample.timestamp());
        let (timestamps, values) = samples.iter().map(Sample::as_tuple).unzip();

        Ok(WindowIter {
            timestamps,
            values,
            pos: 0,
            cur: range.start,
            end: range.end,
            resolution: container.time_resolution(),
            done: false,
        })
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }
}

impl Iterator for WindowIter {
    type Item = (Timestamp, Vec<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cur > self.end {
            return None;
        }
        let start = self.cur;
        let rest = &self.timestamps[self.pos..];
        let len = match start.checked_add_signed(self.resolution) {
            Some(stop) => {
                self.cur = stop;
                rest.partition_point(|ts| *ts < stop)
            }
            // window reaches past the last representable instant
            None => {
                self.done = true;
                rest.len()
            }
        };
        let window = self.values[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Some((start, window))
    }
}

impl SeriesContainer {
    /// One `(window start, reduced value)` pair per window. `Aggregator::None` skips the
    /// windowing and returns the filtered series unchanged.
    ///
    /// Fails with `EmptySeries` when there is nothing to reduce.
    pub fn downsample(&self, aggregator: Aggregator) -> SeriesResult<LineChart> {
        let windows = WindowIter::new(self)?;
        let dataset = self.dataset_type().clone();

        if aggregator == Aggregator::None {
            let data = self.data();
            return Ok(LineChart {
                dataset,
                timestamps: data.timestamps.clone(),
                values: data.values.clone(),
            });
        }

        let (timestamps, values) = windows
            .map(|(start, window)| (start, aggregator.reduce(&window)))
            .unzip();

        Ok(LineChart {
            dataset,
            timestamps,
            values,
        })
    }

    pub fn downsample_mean(&self) -> SeriesResult<LineChart> {
        self.downsample(Aggregator::Mean)
    }

    pub fn downsample_median(&self) -> SeriesResult<LineChart> {
        self.downsample(Aggregator::Median)
    }

    pub fn downsample_sum(&self) -> SeriesResult<LineChart> {
        self.downsample(Aggregator::Sum)
    }

    pub fn downsample_none(&self) -> SeriesResult<LineChart> {
        self.downsample(Aggregator::None)
    }
}
