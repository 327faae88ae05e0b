use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::common::time::{format_duration, parse_duration};
use crate::error::{SeriesError, SeriesResult};
use crate::filters::{heartrate, FilterParams};
use crate::storage::time_series::min_time_resolution;

pub const DEFAULT_HISTOGRAM_BIN_WIDTH: f64 = 5.0;
pub const DEFAULT_DEVICE: &str = "MI_BAND";

pub const ENV_TIME_RESOLUTION: &str = "WEARABLE_TIME_RESOLUTION";
pub const ENV_HISTOGRAM_BIN_WIDTH: &str = "WEARABLE_HIST_BIN_WIDTH";
pub const ENV_HEARTRATE_DELTA: &str = "WEARABLE_HR_DELTA";
pub const ENV_DEVICE: &str = "WEARABLE_DEVICE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Window width for downsampling. Never below one minute.
    #[serde(with = "duration_secs")]
    pub time_resolution: Duration,

    /// Bin width used when histogram options are built from settings.
    pub histogram_bin_width: f64,

    /// Neighbour distance for the heart-rate double-reading correction.
    pub heartrate_delta: f64,

    /// Key of the device mapping used by extraction sources.
    pub device: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_resolution: min_time_resolution(),
            histogram_bin_width: DEFAULT_HISTOGRAM_BIN_WIDTH,
            heartrate_delta: heartrate::DEFAULT_DELTA,
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with whatever valid values are present in the environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var(ENV_TIME_RESOLUTION) {
            match parse_duration(&raw) {
                Ok(resolution) if resolution >= min_time_resolution() => {
                    settings.time_resolution = resolution;
                }
                Ok(resolution) => tracing::warn!(
                    "ignoring {ENV_TIME_RESOLUTION}={}: below 1m",
                    format_duration(resolution)
                ),
                Err(err) => tracing::warn!("ignoring {ENV_TIME_RESOLUTION}: {err}"),
            }
        }
        if let Some(width) = get_positive_setting_from_env(ENV_HISTOGRAM_BIN_WIDTH) {
            settings.histogram_bin_width = width;
        }
        if let Some(delta) = get_positive_setting_from_env(ENV_HEARTRATE_DELTA) {
            settings.heartrate_delta = delta;
        }
        if let Ok(device) = std::env::var(ENV_DEVICE) {
            settings.device = device;
        }
        settings
    }

    pub fn validate(&self) -> SeriesResult<()> {
        if self.time_resolution < min_time_resolution() {
            return Err(SeriesError::InvalidConfiguration(format!(
                "time resolution {} is below 1m",
                format_duration(self.time_resolution)
            )));
        }
        if !(self.histogram_bin_width > 0.0 && self.histogram_bin_width.is_finite()) {
            return Err(SeriesError::InvalidConfiguration(format!(
                "histogram bin width must be positive, got {}",
                self.histogram_bin_width
            )));
        }
        if !(self.heartrate_delta > 0.0 && self.heartrate_delta.is_finite()) {
            return Err(SeriesError::InvalidConfiguration(format!(
                "heartrate delta must be positive, got {}",
                self.heartrate_delta
            )));
        }
        Ok(())
    }

    /// Parameters for the heart-rate filter carrying the configured delta.
    pub fn heartrate_params(&self) -> FilterParams {
        FilterParams::new().with(heartrate::DELTA_PARAM, self.heartrate_delta)
    }
}

fn get_setting_from_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {name}={raw}: not a valid value");
            None
        }
    }
}

fn get_positive_setting_from_env(name: &str) -> Option<f64> {
    let value = get_setting_from_env::<f64>(name)?;
    if value > 0.0 && value.is_finite() {
        Some(value)
    } else {
        tracing::warn!("ignoring {name}={value}: must be positive");
        None
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| serde::de::Error::custom(format!("{secs} seconds is out of range")))
    }
}
