use chrono::Duration;
use std::cell::OnceCell;
use std::sync::Arc;

use super::{DatasetType, SeriesColumn, SeriesData, SeriesKey, TimeRange};
use crate::common::time::format_duration;
use crate::common::types::{Sample, Timestamp};
use crate::config::Settings;
use crate::error::{SeriesError, SeriesResult};
use crate::filters::{AcceptanceRegistry, AcceptanceTester, FilterChain, FilterParams, FilterRegistry};
use crate::iter::SampleSliceIter;

/// Smallest window a container accepts.
pub fn min_time_resolution() -> Duration {
    Duration::minutes(1)
}

/// Holds one dataset: the accepted raw samples in append order plus a lazily computed,
/// filtered view of them.
///
/// The filtered view is either absent (stale) or exactly the filter chain applied to the
/// raw samples (fresh). `append` and `add_filter` make it stale; the next read recomputes
/// it once and serves later reads from the cache.
#[derive(Debug, Clone)]
pub struct SeriesContainer {
    dataset_type: DatasetType,
    samples: Vec<Sample>,
    time_resolution: Duration,
    acceptance: AcceptanceTester,
    filters: FilterChain,
    filtered: OnceCell<SeriesData>,
}

impl SeriesContainer {
    /// Create an empty container with the default registries and a 1 minute resolution.
    pub fn new(dataset_type: impl Into<DatasetType>) -> Self {
        Self::with_registries(
            dataset_type,
            &AcceptanceRegistry::default(),
            Arc::new(FilterRegistry::default()),
        )
    }

    pub fn with_resolution(
        dataset_type: impl Into<DatasetType>,
        time_resolution: Duration,
    ) -> SeriesResult<Self> {
        let mut res = Self::new(dataset_type);
        res.set_time_resolution(time_resolution)?;
        Ok(res)
    }

    /// Create an empty container whose acceptance rule and available filters come from the
    /// given registries instead of the built-in ones.
    pub fn with_registries(
        dataset_type: impl Into<DatasetType>,
        acceptance: &AcceptanceRegistry,
        filters: Arc<FilterRegistry>,
    ) -> Self {
        let dataset_type = dataset_type.into();
        SeriesContainer {
            acceptance: acceptance.tester(&dataset_type),
            dataset_type,
            samples: vec![],
            time_resolution: min_time_resolution(),
            filters: FilterChain::with_registry(filters),
            filtered: OnceCell::new(),
        }
    }

    pub fn from_settings(
        dataset_type: impl Into<DatasetType>,
        settings: &Settings,
    ) -> SeriesResult<Self> {
        Self::with_resolution(dataset_type, settings.time_resolution)
    }

    /// An empty container sharing this one's type, resolution, acceptance rule and filter
    /// registry, but none of its filters.
    fn empty_like(&self) -> Self {
        SeriesContainer {
            dataset_type: self.dataset_type.clone(),
            samples: vec![],
            time_resolution: self.time_resolution,
            acceptance: self.acceptance.clone(),
            filters: FilterChain::with_registry(Arc::clone(self.filters.registry())),
            filtered: OnceCell::new(),
        }
    }

    pub fn dataset_type(&self) -> &DatasetType {
        &self.dataset_type
    }

    /// Number of stored raw samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stores the sample if the dataset's acceptance rule lets it in. Rejected samples are
    /// dropped silently; the return value tells whether it was stored.
    pub fn append(&mut self, timestamp: Timestamp, value: f64) -> bool {
        self.append_sample(Sample::new(timestamp, value))
    }

    pub fn append_sample(&mut self, sample: Sample) -> bool {
        if !self.acceptance.accepts(&sample) {
            tracing::trace!(
                dataset = %self.dataset_type,
                timestamp = %sample.timestamp(),
                value = sample.value(),
                "rejected sample"
            );
            return false;
        }
        self.samples.push(sample);
        self.invalidate();
        true
    }

    /// Adds a registered filter. Unknown or repeated names are ignored.
    pub fn add_filter(&mut self, name: &str, params: FilterParams) -> bool {
        let added = self.filters.add_filter(name, params);
        self.invalidate();
        added
    }

    /// Like [`SeriesContainer::add_filter`] but reports unknown filter names.
    pub fn try_add_filter(&mut self, name: &str, params: FilterParams) -> SeriesResult<bool> {
        let added = self.filters.try_add_filter(name, params);
        self.invalidate();
        added
    }

    pub fn filter_count(&self) -> usize {
        self.filters.count()
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// The insert-time gate chosen for this container's dataset type.
    pub fn acceptance(&self) -> &AcceptanceTester {
        &self.acceptance
    }

    fn invalidate(&mut self) {
        self.filtered.take();
    }

    /// Whether the filtered view is cached and current.
    pub fn is_fresh(&self) -> bool {
        self.filtered.get().is_some()
    }

    /// The filtered view, recomputed only if a mutation happened since the last read.
    pub fn data(&self) -> &SeriesData {
        self.filtered.get_or_init(|| {
            tracing::debug!(
                dataset = %self.dataset_type,
                samples = self.samples.len(),
                filters = self.filters.count(),
                "recomputing filtered series"
            );
            self.filters.apply(SeriesData::from_samples(&self.samples))
        })
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.data().timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.data().values
    }

    /// Keyed read: `"timestamps"`/`0` or `"values"`/`1`.
    pub fn column<K>(&self, key: K) -> SeriesResult<SeriesColumn<'_>>
    where
        K: TryInto<SeriesKey, Error = SeriesError>,
    {
        let key = key.try_into()?;
        let data = self.data();
        Ok(match key {
            SeriesKey::Timestamps => SeriesColumn::Timestamps(&data.timestamps),
            SeriesKey::Values => SeriesColumn::Values(&data.values),
        })
    }

    pub fn time_resolution(&self) -> Duration {
        self.time_resolution
    }

    /// Sets the downsampling window. Values below one minute are refused and leave the
    /// current resolution in place.
    pub fn set_time_resolution(&mut self, value: Duration) -> SeriesResult<Duration> {
        if value < min_time_resolution() {
            return Err(SeriesError::ResolutionTooSmall(value));
        }
        tracing::debug!(
            dataset = %self.dataset_type,
            "time resolution set to {}",
            format_duration(value)
        );
        self.time_resolution = value;
        Ok(self.time_resolution)
    }

    /// Earliest filtered timestamp.
    pub fn timestamp_start(&self) -> SeriesResult<Timestamp> {
        self.data().min_timestamp()
    }

    /// Latest filtered timestamp.
    pub fn timestamp_end(&self) -> SeriesResult<Timestamp> {
        self.data().max_timestamp()
    }

    pub fn timerange(&self) -> SeriesResult<TimeRange> {
        Ok(TimeRange::new(self.timestamp_start()?, self.timestamp_end()?))
    }

    /// New container holding the filtered samples with `start <= timestamp < end`.
    /// Samples enter it through the normal append path.
    pub fn time_slice(&self, start: Timestamp, end: Timestamp) -> SeriesContainer {
        let range = TimeRange::new(start, end);
        let mut res = self.empty_like();
        res.extend(self.data().iter().filter(|s| range.contains(s.timestamp())));
        res
    }

    /// Raw samples in insertion order, unfiltered.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Lazy walk over the raw samples. Each call starts from the beginning.
    pub fn iter(&self) -> SampleSliceIter<'_> {
        SampleSliceIter::new(&self.samples)
    }
}

impl<'a> IntoIterator for &'a SeriesContainer {
    type Item = Sample;
    type IntoIter = SampleSliceIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Sample> for SeriesContainer {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        for sample in iter {
            self.append_sample(sample);
        }
    }
}

impl Extend<(Timestamp, f64)> for SeriesContainer {
    fn extend<I: IntoIterator<Item = (Timestamp, f64)>>(&mut self, iter: I) {
        for (timestamp, value) in iter {
            self.append(timestamp, value);
        }
    }
}
