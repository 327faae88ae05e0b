use ahash::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::common::types::Sample;
use crate::storage::DatasetType;

pub type AcceptFn = Arc<dyn Fn(&Sample) -> bool + Send + Sync>;

/// Insert-time gate for one dataset type. Chosen once when a container is built.
#[derive(Clone)]
pub struct AcceptanceTester {
    predicate: Option<AcceptFn>,
}

impl AcceptanceTester {
    pub fn accept_all() -> Self {
        Self { predicate: None }
    }

    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Sample) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn accepts(&self, sample: &Sample) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(sample),
            None => true,
        }
    }
}

impl Debug for AcceptanceTester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.predicate.is_some() { "predicate" } else { "accept_all" };
        f.debug_tuple("AcceptanceTester").field(&kind).finish()
    }
}

/// Maps dataset tags to acceptance predicates.
#[derive(Clone)]
pub struct AcceptanceRegistry {
    testers: HashMap<String, AcceptFn>,
}

impl AcceptanceRegistry {
    pub fn empty() -> Self {
        Self { testers: HashMap::default() }
    }

    pub fn register<F>(&mut self, dataset: &DatasetType, predicate: F)
    where
        F: Fn(&Sample) -> bool + Send + Sync + 'static,
    {
        self.testers.insert(dataset.as_str().to_string(), Arc::new(predicate));
    }

    /// Returns the tester for `dataset`, accepting everything when no rule is registered.
    pub fn tester(&self, dataset: &DatasetType) -> AcceptanceTester {
        match self.testers.get(dataset.as_str()) {
            Some(predicate) => AcceptanceTester {
                predicate: Some(Arc::clone(predicate)),
            },
            None => AcceptanceTester::accept_all(),
        }
    }
}

impl Default for AcceptanceRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(&DatasetType::Heartrate, accept_heartrate);
        registry.register(&DatasetType::Intensity, accept_intensity);
        registry.register(&DatasetType::Steps, accept_steps);
        registry
    }
}

impl Debug for AcceptanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.testers.keys().collect();
        tags.sort();
        f.debug_struct("AcceptanceRegistry").field("testers", &tags).finish()
    }
}

/// 255 is the sensor's "no reading" marker; zero and below never happen on a live wrist.
pub fn accept_heartrate(sample: &Sample) -> bool {
    let value = sample.value();
    !(value >= 255.0 || value <= 0.0)
}

pub fn accept_intensity(sample: &Sample) -> bool {
    !(sample.value() >= 255.0)
}

pub fn accept_steps(sample: &Sample) -> bool {
    !(sample.value() < 0.0)
}
