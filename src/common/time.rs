use chrono::{Duration, TimeZone, Utc};
use crate::common::types::Timestamp;
use crate::error::{SeriesError, SeriesResult};

/// Converts unix seconds as stored by the device export into a timestamp.
pub fn from_unix_seconds(secs: i64) -> SeriesResult<Timestamp> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| SeriesError::InvalidTimestamp(format!("{secs} is out of range")))
}

/// Parses durations such as `90s`, `5m`, `1h30m`, `1d` or `2w`. A bare integer is read as seconds.
/// Values that do not fit a `Duration` are rejected, never wrapped or clamped.
pub fn parse_duration(arg: &str) -> SeriesResult<Duration> {
    let arg = arg.trim();
    if let Ok(secs) = arg.parse::<i64>() {
        if secs < 0 {
            return Err(SeriesError::InvalidDuration(format!("{arg} is negative")));
        }
        return Duration::try_seconds(secs)
            .ok_or_else(|| SeriesError::InvalidDuration(format!("{arg} is out of range")));
    }
    let std = humantime::parse_duration(arg)
        .map_err(|e| SeriesError::InvalidDuration(format!("failed to parse '{arg}': {e}")))?;
    Duration::from_std(std)
        .map_err(|_| SeriesError::InvalidDuration(format!("{arg} is out of range")))
}

pub fn format_duration(d: Duration) -> String {
    match d.to_std() {
        Ok(std) => humantime::format_duration(std).to_string(),
        Err(_) => {
            let abs = (-d).to_std().unwrap_or_default();
            format!("-{}", humantime::format_duration(abs))
        }
    }
}
