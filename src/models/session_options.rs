//! Options chosen on the selection screen before a study session starts.
use crate::error::SessionError;
use serde::Deserialize;
use std::time::Duration;

use super::Side;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub randomize: bool,
    pub definition_first: bool,
    pub read_aloud: bool,
    pub autoflip: bool,
    pub autoflip_interval_seconds: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            randomize: true,
            definition_first: false,
            read_aloud: false,
            autoflip: false,
            autoflip_interval_seconds: 5.0,
        }
    }
}

/// Longest accepted autoflip interval: one day.
pub const MAX_AUTOFLIP_INTERVAL_SECS: f64 = 86_400.0;

/// Converts an interval in seconds, rejecting anything that is not a
/// positive, finite number of at most [`MAX_AUTOFLIP_INTERVAL_SECS`].
fn interval_from_secs(secs: f64, shown: &str) -> Result<Duration, SessionError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(SessionError::Configuration(format!(
            "autoflip interval must be a positive number of seconds, got {}",
            shown
        )));
    }
    if secs > MAX_AUTOFLIP_INTERVAL_SECS {
        return Err(SessionError::Configuration(format!(
            "autoflip interval must be at most {} seconds, got {}",
            MAX_AUTOFLIP_INTERVAL_SECS, shown
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        SessionError::Configuration(format!("autoflip interval {}: {}", shown, e))
    })
}

impl SessionOptions {
    /// Rejects an autoflip interval that is not a positive, finite number of
    /// seconds no longer than a day. The interval is ignored when autoflip is off.
    pub fn validate(&self) -> Result<(), SessionError> {
        if !self.autoflip {
            return Ok(());
        }
        let secs = self.autoflip_interval_seconds;
        interval_from_secs(secs, &secs.to_string())?;
        Ok(())
    }

    /// Parses the free-text interval field of the selection form.
    pub fn parse_interval(text: &str) -> Result<f64, SessionError> {
        let trimmed = text.trim();
        let secs: f64 = trimmed.parse().map_err(|_| {
            SessionError::Configuration(format!(
                "autoflip interval '{}' is not a number",
                trimmed
            ))
        })?;
        interval_from_secs(secs, trimmed)?;
        Ok(secs)
    }

    /// The interval as a `Duration`, clamped into the accepted range.
    /// Values `validate` rejects come out as zero.
    pub fn autoflip_interval(&self) -> Duration {
        let secs = self.autoflip_interval_seconds;
        if !secs.is_finite() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs.min(MAX_AUTOFLIP_INTERVAL_SECS)).unwrap_or(Duration::ZERO)
    }

    pub fn front_side(&self) -> Side {
        if self.definition_first {
            Side::Definition
        } else {
            Side::Term
        }
    }
}
