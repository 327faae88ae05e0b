//! Double-reading correction for optical heart-rate sensors.
//!
//! The sensor occasionally reports a reading at twice its true value. Such a reading sits
//! between two neighbours that are close to its half, so halving it restores continuity.

use crate::filters::FilterParams;
use crate::storage::SeriesData;

pub const DELTA_PARAM: &str = "delta_doublefilter";
pub const DEFAULT_DELTA: f64 = 3.0;

/// Halves every interior value whose half lies within `delta_doublefilter` (exclusive) of
/// both neighbours. Runs left to right over the working copy, so a corrected value is what
/// the next index compares against. The first and last values are never modified.
pub fn correct_double_readings(mut data: SeriesData, params: &FilterParams) -> SeriesData {
    let delta = params.get_or(DELTA_PARAM, DEFAULT_DELTA);
    let values = &mut data.values;
    if values.len() < 3 {
        return data;
    }

    let mut corrected = 0usize;
    for i in 1..values.len() - 1 {
        let half = values[i] / 2.0;
        let diff_lower = (half - values[i - 1]).abs();
        let diff_upper = (half - values[i + 1]).abs();
        if diff_lower < delta && diff_upper < delta {
            values[i] = halve(values[i]);
            corrected += 1;
        }
    }

    if corrected > 0 {
        tracing::debug!(corrected, delta, "corrected doubled heart-rate readings");
    }
    data
}

// Integral readings stay integral.
fn halve(value: f64) -> f64 {
    if value.fract() == 0.0 {
        (value / 2.0).trunc()
    } else {
        value / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> SeriesData {
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| start + Duration::minutes(i as i64))
            .collect();
        SeriesData::new_with_data(timestamps, values.to_vec())
    }

    #[test]
    fn test_corrects_isolated_double() {
        let input = series(&[50.0, 52.0, 51.0, 101.0, 53.0, 52.0, 50.0, 106.0, 51.0, 52.0]);
        let res = correct_double_readings(input.clone(), &FilterParams::new());
        assert_eq!(res.timestamps, input.timestamps);
        // 106 stays: its half (53) is exactly 3 away from 50, and the test is strict
        assert_eq!(
            res.values,
            vec![50.0, 52.0, 51.0, 50.0, 53.0, 52.0, 50.0, 106.0, 51.0, 52.0]
        );
    }

    #[test]
    fn test_edges_untouched() {
        let res = correct_double_readings(series(&[100.0, 50.0, 100.0]), &FilterParams::new());
        assert_eq!(res.values, vec![100.0, 50.0, 100.0]);

        let res = correct_double_readings(series(&[120.0, 60.0]), &FilterParams::new());
        assert_eq!(res.values, vec![120.0, 60.0]);
    }

    #[test]
    fn test_delta_parameter() {
        let input = series(&[50.0, 106.0, 51.0]);
        let res = correct_double_readings(input.clone(), &FilterParams::new());
        assert_eq!(res.values, vec![50.0, 106.0, 51.0]);

        let params = FilterParams::new().with(DELTA_PARAM, 4.0);
        let res = correct_double_readings(input, &params);
        assert_eq!(res.values, vec![50.0, 53.0, 51.0]);
    }

    #[test]
    fn test_fractional_reading_halved_exactly() {
        let res = correct_double_readings(series(&[60.0, 121.0, 61.0]), &FilterParams::new());
        assert_eq!(res.values, vec![60.0, 60.0, 61.0]);

        let res = correct_double_readings(series(&[60.0, 120.5, 61.0]), &FilterParams::new());
        assert_eq!(res.values, vec![60.0, 60.25, 61.0]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(correct_double_readings(SeriesData::default(), &FilterParams::new()).is_empty());
        let res = correct_double_readings(series(&[200.0]), &FilterParams::new());
        assert_eq!(res.values, vec![200.0]);
    }
}
