use serde::{Deserialize, Serialize};
use std::fmt::Display;
use crate::common::types::Timestamp;

/// Closed `[start, end]` span covered by a series, or a half-open query window,
/// depending on where it is used. See [`TimeRange::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Half-open membership: `start <= ts < end`.
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts < self.end
    }

    pub fn as_array(&self) -> [Timestamp; 2] {
        [self.start, self.end]
    }
}

impl From<TimeRange> for [Timestamp; 2] {
    fn from(range: TimeRange) -> Self {
        range.as_array()
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
