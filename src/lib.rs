//! Validated, filtered and windowed time series for wearable-device exports.
//!
//! Samples enter a [`SeriesContainer`] through a per-dataset acceptance gate, are exposed
//! through a lazily cached chain of named filters and can be downsampled into line or
//! heatmap shapes for plotting.

pub mod aggregators;
pub mod chart;
pub mod common;
pub mod config;
pub mod error;
pub mod filters;
pub mod iter;
pub mod source;
pub mod storage;

#[cfg(test)]
mod tests;

pub use aggregators::{Aggregator, HistogramOptions};
pub use chart::{ChartData, HeatmapChart, LineChart};
pub use common::types::{RawRow, Sample, SampleLike, Timestamp};
pub use config::Settings;
pub use error::{SeriesError, SeriesResult};
pub use filters::{
    AcceptanceRegistry, AcceptanceTester, FilterChain, FilterParams, FilterRegistry,
    HEARTRATE_FILTER,
};
pub use source::{retrieve_dataset, DeviceMapping, SampleSource, VecSource};
pub use storage::{DatasetType, SeriesContainer, SeriesData, TimeRange};
