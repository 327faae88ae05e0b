use rand::prelude::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::ops::Range;

use crate::tests::generators::create_rng;

/// Uniform values in `range`.
pub struct RandomGenerator {
    rng: StdRng,
    range: Range<f64>,
}

impl RandomGenerator {
    pub fn new(seed: Option<u64>, range: &Range<f64>) -> Result<Self, String> {
        let rng = create_rng(seed)?;
        Ok(Self {
            rng,
            range: range.clone(),
        })
    }
}

impl Iterator for RandomGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.rng.gen_range(self.range.start..self.range.end))
    }
}

/// Normally distributed jitter around zero, clipped to `±limit`.
pub struct JitterGenerator {
    rng: StdRng,
    normal: Normal<f64>,
    limit: f64,
}

impl JitterGenerator {
    pub fn new(seed: Option<u64>, std_dev: f64, limit: f64) -> Result<Self, String> {
        let rng = create_rng(seed)?;
        let normal = Normal::new(0.0, std_dev).map_err(|e| format!("bad std dev: {e}"))?;
        Ok(Self { rng, normal, limit })
    }
}

impl Iterator for JitterGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        let v: f64 = self.normal.sample(&mut self.rng);
        Some(v.clamp(-self.limit, self.limit))
    }
}
