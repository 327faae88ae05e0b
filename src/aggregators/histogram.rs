use serde::{Deserialize, Serialize};

use super::WindowIter;
use crate::chart::HeatmapChart;
use crate::config::Settings;
use crate::error::{SeriesError, SeriesResult};
use crate::storage::SeriesContainer;

pub const DEFAULT_BIN_WIDTH: f64 = 5.0;
/// Upper bound on the number of bins a histogram may span.
pub const MAX_BINS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramOptions {
    /// Lowest bin edge. Derived from the data when unset.
    pub min: Option<f64>,
    /// Exclusive upper bound for bin edges. Derived from the data when unset.
    pub max: Option<f64>,
    pub bin_width: f64,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            bin_width: DEFAULT_BIN_WIDTH,
        }
    }
}

impl HistogramOptions {
    pub fn new(min: f64, max: f64, bin_width: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            bin_width,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bin_width: settings.histogram_bin_width,
            ..Default::default()
        }
    }
}

/// Rounds toward zero to a multiple of ten: 57 -> 50, -57 -> -50.
pub fn truncate_to_tens(value: f64) -> f64 {
    (value / 10.0).trunc() * 10.0
}

/// Edges `min, min + width, ...` strictly below `max`. At least two edges are needed to form
/// a bin, and at most `MAX_BINS` bins are built.
pub fn bin_edges(min: f64, max: f64, bin_width: f64) -> SeriesResult<Vec<f64>> {
    let invalid = || SeriesError::InvalidHistogramRange { min, max, bin_width };
    if !(bin_width > 0.0) || !min.is_finite() || !max.is_finite() {
        return Err(invalid());
    }
    let bins = ((max - min) / bin_width).ceil();
    if !(bins.is_finite() && bins <= MAX_BINS as f64) {
        return Err(invalid());
    }
    let edges: Vec<f64> = (0..=bins.max(0.0) as usize)
        .map(|k| min + k as f64 * bin_width)
        .take_while(|edge| *edge < max)
        .collect();
    if edges.len() < 2 {
        return Err(invalid());
    }
    Ok(edges)
}

/// Bin counts for `values`. Bins are half-open except the last, which also takes the
/// rightmost edge. Values outside the edges and NaN are dropped.
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let (first, last) = (edges[0], edges[bins]);
    for &v in values {
        if !(v >= first && v <= last) {
            continue;
        }
        let idx = edges.partition_point(|&edge| edge <= v).saturating_sub(1);
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Density histogram of one window, rescaled so its largest bin is 1. A window with no
/// counted values gives a row of zeros.
pub fn normalized_row(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let counts = bin_counts(values, edges);
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    let mut row: Vec<f64> = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&count, edge)| count as f64 / (total as f64 * (edge[1] - edge[0])))
        .collect();
    let peak = row.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        row.iter_mut().for_each(|v| *v /= peak);
    }
    row
}

impl SeriesContainer {
    /// Per-window value histograms over the same windows as [`SeriesContainer::downsample`].
    /// The timestamp axis gets one trailing entry equal to the last filtered timestamp.
    pub fn downsample_histogram(&self, options: &HistogramOptions) -> SeriesResult<HeatmapChart> {
        let windows = WindowIter::new(self)?;
        let end = windows.end();
        let data = self.data();
        let min = match options.min {
            Some(min) => min,
            None => truncate_to_tens(data.min_value()?),
        };
        let max = match options.max {
            Some(max) => max,
            None => truncate_to_tens(data.max_value()?),
        };
        let edges = bin_edges(min, max, options.bin_width)?;

        let mut timestamps = Vec::new();
        let mut histogram_rows = Vec::new();
        for (start, window) in windows {
            timestamps.push(start);
            histogram_rows.push(normalized_row(&window, &edges));
        }
        timestamps.push(end);

        tracing::debug!(
            dataset = %self.dataset_type(),
            rows = histogram_rows.len(),
            bins = edges.len() - 1,
            "built histogram"
        );

        Ok(HeatmapChart {
            dataset: self.dataset_type().clone(),
            timestamps,
            bin_edges: edges,
            histogram_rows,
        })
    }
}
