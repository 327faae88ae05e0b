use chrono::{Duration, TimeZone, Utc};

use crate::common::types::{Sample, Timestamp};
use crate::tests::generators::{JitterGenerator, RandomGenerator};

/// Parameters for a synthetic optical heart-rate recording.
#[derive(Debug, Clone)]
pub struct HeartrateOptions {
    pub start: Timestamp,
    pub interval: Duration,
    pub samples: usize,
    /// Resting level the readings jitter around.
    pub baseline: f64,
    /// Every n-th interior reading is reported doubled.
    pub doubled_every: Option<usize>,
    /// Fraction of readings replaced by the sensor's 255 "no reading" marker.
    pub dropout_rate: f64,
    pub seed: Option<u64>,
}

impl Default for HeartrateOptions {
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap(),
            interval: Duration::minutes(1),
            samples: 240,
            baseline: 68.0,
            doubled_every: None,
            dropout_rate: 0.0,
            seed: Some(42),
        }
    }
}

/// A generated recording: what the sensor reported and what it should have reported.
#[derive(Debug, Clone)]
pub struct HeartrateSeries {
    pub reported: Vec<Sample>,
    pub clean: Vec<Sample>,
}

impl HeartrateSeries {
    pub fn reported_values(&self) -> Vec<f64> {
        self.reported.iter().map(|s| s.value()).collect()
    }

    pub fn clean_values(&self) -> Vec<f64> {
        self.clean.iter().map(|s| s.value()).collect()
    }
}

/// Integral readings within 1 of the baseline, so neighbours never differ by more than 2.
/// Doubled readings are spaced at least three apart and never at either end. Dropped
/// readings appear only in `reported`.
pub fn generate_heartrate(options: &HeartrateOptions) -> Result<HeartrateSeries, String> {
    let jitter = JitterGenerator::new(options.seed, 0.6, 1.0)?;
    let mut dropouts = RandomGenerator::new(options.seed.map(|s| s + 1), &(0.0..1.0))?;
    let every = options.doubled_every.map(|n| n.max(3));

    let mut res = HeartrateSeries {
        reported: Vec::with_capacity(options.samples),
        clean: Vec::with_capacity(options.samples),
    };
    for (i, noise) in jitter.take(options.samples).enumerate() {
        let ts = options.start + options.interval * i as i32;
        let value = (options.baseline + noise).round();
        let interior = i > 0 && i + 1 < options.samples;
        let dropout = dropouts.next().unwrap_or(1.0) < options.dropout_rate;

        if dropout {
            res.reported.push(Sample::new(ts, 255.0));
            continue;
        }
        let doubled = interior && every.map_or(false, |n| i % n == n / 2);
        let reported = if doubled { value * 2.0 } else { value };
        res.reported.push(Sample::new(ts, reported));
        res.clean.push(Sample::new(ts, value));
    }
    Ok(res)
}
