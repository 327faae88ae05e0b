//! Read-time transforms over a whole series.
//!
//! A [`FilterChain`] holds an ordered, de-duplicated list of named filters looked up in a
//! [`FilterRegistry`]. Applying the chain folds the projected [`SeriesData`] through every
//! filter in insertion order, each call receiving the parameters it was added with.

mod acceptance;
pub mod heartrate;

use ahash::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{SeriesError, SeriesResult};
use crate::storage::SeriesData;
pub use acceptance::*;

pub const HEARTRATE_FILTER: &str = "heartrate";

/// A registered transform. It owns the data it is given, so the container's raw samples
/// are never touched.
pub type FilterFn = Arc<dyn Fn(SeriesData, &FilterParams) -> SeriesData + Send + Sync>;

/// Named numeric parameters stored alongside a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams(BTreeMap<String, f64>);

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// A registry with no filters at all.
    pub fn empty() -> Self {
        Self { filters: HashMap::default() }
    }

    /// Adds or replaces the transform registered under `name`.
    pub fn register<F>(&mut self, name: &str, transform: F)
    where
        F: Fn(SeriesData, &FilterParams) -> SeriesData + Send + Sync + 'static,
    {
        self.filters.insert(name.to_string(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(HEARTRATE_FILTER, heartrate::correct_double_readings);
        registry
    }
}

impl Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.filters.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

#[derive(Clone)]
struct FilterEntry {
    name: String,
    params: FilterParams,
    transform: FilterFn,
}

#[derive(Clone)]
pub struct FilterChain {
    registry: Arc<FilterRegistry>,
    entries: SmallVec<[FilterEntry; 2]>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(FilterRegistry::default()))
    }

    pub fn with_registry(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            entries: SmallVec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Adds `name` with `params`. Returns `Ok(false)` if the filter is already in the chain
    /// and `UnknownFilter` if the registry does not know it.
    pub fn try_add_filter(&mut self, name: &str, params: FilterParams) -> SeriesResult<bool> {
        let transform = self
            .registry
            .get(name)
            .ok_or_else(|| SeriesError::UnknownFilter(name.to_string()))?;
        if self.contains(name) {
            return Ok(false);
        }
        self.entries.push(FilterEntry {
            name: name.to_string(),
            params,
            transform: Arc::clone(transform),
        });
        Ok(true)
    }

    /// Tolerant form of [`FilterChain::try_add_filter`]: unknown and repeated names are no-ops.
    pub fn add_filter(&mut self, name: &str, params: FilterParams) -> bool {
        match self.try_add_filter(name, params) {
            Ok(added) => added,
            Err(err) => {
                tracing::debug!("ignoring filter: {err}");
                false
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn params(&self, name: &str) -> Option<&FilterParams> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.params)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds `data` through every filter. A filter that leaves the two arrays at different
    /// lengths has its output cut back to the shorter one.
    pub fn apply(&self, data: SeriesData) -> SeriesData {
        self.entries.iter().fold(data, |data, entry| {
            let mut data = (entry.transform)(data, &entry.params);
            let removed = data.truncate_to_shortest();
            if removed > 0 {
                tracing::warn!(filter = %entry.name, removed, "filter returned arrays of different lengths");
            }
            data
        })
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (&entry.name, &entry.params)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn hr_data() -> SeriesData {
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let values = vec![50.0, 52.0, 51.0, 101.0, 53.0, 52.0, 50.0, 106.0, 51.0, 52.0];
        let timestamps = (0..values.len())
            .map(|i| start + Duration::minutes(i as i64))
            .collect();
        SeriesData::new_with_data(timestamps, values)
    }

    #[test]
    fn test_addition() {
        let mut chain = FilterChain::new();
        assert!(chain.add_filter(HEARTRATE_FILTER, FilterParams::new()));
        assert_eq!(chain.count(), 1);
        assert_eq!(chain.names().collect::<Vec<_>>(), vec![HEARTRATE_FILTER]);
    }

    #[test]
    fn test_invalid_addition() {
        let mut chain = FilterChain::new();
        assert!(!chain.add_filter("not defined as filter name", FilterParams::new()));
        assert_eq!(chain.count(), 0);
        assert!(matches!(
            chain.try_add_filter("not defined as filter name", FilterParams::new()),
            Err(SeriesError::UnknownFilter(_))
        ));
    }

    #[test]
    fn test_double_addition() {
        let mut chain = FilterChain::new();
        chain.add_filter(HEARTRATE_FILTER, FilterParams::new());
        assert!(!chain.add_filter(HEARTRATE_FILTER, FilterParams::new().with("delta_doublefilter", 9.0)));
        assert_eq!(chain.count(), 1);
        // the first registration's parameters are kept
        assert!(chain.params(HEARTRATE_FILTER).unwrap().is_empty());
    }

    #[test]
    fn test_param_passing() {
        let mut chain = FilterChain::new();
        chain.add_filter(HEARTRATE_FILTER, FilterParams::new().with("test_param", 1.0));
        let params = chain.params(HEARTRATE_FILTER).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("test_param"), Some(1.0));
    }

    #[test]
    fn test_no_filter_returns_input() {
        let chain = FilterChain::new();
        assert_eq!(chain.apply(hr_data()), hr_data());
    }

    #[test]
    fn test_heartrate_filter_through_chain() {
        let mut chain = FilterChain::new();
        chain.add_filter(HEARTRATE_FILTER, FilterParams::new());
        let input = hr_data();
        let res = chain.apply(input.clone());
        assert_eq!(res.timestamps, input.timestamps);
        assert_eq!(
            res.values,
            vec![50.0, 52.0, 51.0, 50.0, 53.0, 52.0, 50.0, 106.0, 51.0, 52.0]
        );
    }

    #[test]
    fn test_filters_run_in_insertion_order() {
        let mut registry = FilterRegistry::empty();
        registry.register("double", |mut data: SeriesData, _: &FilterParams| {
            data.values.iter_mut().for_each(|v| *v *= 2.0);
            data
        });
        registry.register("offset", |mut data: SeriesData, params: &FilterParams| {
            let by = params.get_or("by", 0.0);
            data.values.iter_mut().for_each(|v| *v += by);
            data
        });
        let mut chain = FilterChain::with_registry(Arc::new(registry));
        chain.add_filter("double", FilterParams::new());
        chain.add_filter("offset", FilterParams::new().with("by", 1.0));

        let data = SeriesData::new_with_data(vec![Utc::now()], vec![3.0]);
        assert_eq!(chain.apply(data).values, vec![7.0]);
    }

    #[test]
    fn test_uneven_filter_output_is_realigned() {
        let mut registry = FilterRegistry::empty();
        registry.register("drop_last_value", |mut data: SeriesData, _: &FilterParams| {
            data.values.pop();
            data
        });
        let mut chain = FilterChain::with_registry(Arc::new(registry));
        chain.add_filter("drop_last_value", FilterParams::new());

        let input = hr_data();
        let res = chain.apply(input.clone());
        assert_eq!(res.len(), input.len() - 1);
        assert_eq!(res.values.len(), res.timestamps.len());
        assert_eq!(res.timestamps[..], input.timestamps[..input.len() - 1]);
    }

    #[test]
    fn test_apply_is_pure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = FilterRegistry::default();
        registry.register("count", move |data: SeriesData, _: &FilterParams| {
            counter.fetch_add(1, Ordering::SeqCst);
            data
        });
        let mut chain = FilterChain::with_registry(Arc::new(registry));
        chain.add_filter(HEARTRATE_FILTER, FilterParams::new());
        chain.add_filter("count", FilterParams::new());

        let first = chain.apply(hr_data());
        let second = chain.apply(hr_data());
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
