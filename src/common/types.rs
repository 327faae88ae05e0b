use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

/// A raw row as handed over by an extraction source: unix seconds and the stored value.
pub type RawRow = (i64, f64);

pub trait SampleLike {
    fn timestamp(&self) -> Timestamp;
    fn value(&self) -> f64;
}

/// A single (timestamp, value) reading. Fields are fixed at construction; validity is decided
/// by the acceptance tester of the container it is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    timestamp: Timestamp,
    value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Sample { timestamp, value }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Positional view, timestamp first.
    pub fn as_tuple(&self) -> (Timestamp, f64) {
        (self.timestamp, self.value)
    }
}

impl SampleLike for Sample {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
    fn value(&self) -> f64 {
        self.value
    }
}

impl From<Sample> for (Timestamp, f64) {
    fn from(sample: Sample) -> Self {
        sample.as_tuple()
    }
}

impl From<(Timestamp, f64)> for Sample {
    fn from((timestamp, value): (Timestamp, f64)) -> Self {
        Sample::new(timestamp, value)
    }
}
