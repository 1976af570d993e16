// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Running pace and the pace → percent-of-threshold-speed conversion.
//!
//! The KICKR RUN plan format expresses interval intensity as a fraction of
//! the runner's threshold speed. Speed is the reciprocal of pace, so a
//! target pace converts as `threshold_pace / target_pace × 100`.

use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Meters per mile, for converting pace to the m/s threshold speed the
/// plan file header carries.
const METERS_PER_MILE: f64 = 1609.34;

/// Upper bound the device accepts for a percent-of-threshold target.
pub const MAX_PERCENT: f64 = 200.0;

/// A running pace as whole seconds per mile.
///
/// Parsed from and displayed as `m:ss` (e.g. `7:30`), which is also its
/// JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pace(u32);

impl Pace {
    pub fn from_seconds_per_mile(secs: u32) -> Self {
        Pace(secs)
    }

    pub fn seconds_per_mile(&self) -> u32 {
        self.0
    }

    /// Speed in meters per second, for the plan file header.
    ///
    /// Fails with `InvalidConfiguration` on a zero pace since no speed can
    /// be derived from it.
    pub fn speed_mps(&self) -> Result<f64, AppError> {
        if self.0 == 0 {
            return Err(AppError::InvalidConfiguration(
                "threshold pace must be greater than zero".to_string(),
            ));
        }
        Ok(METERS_PER_MILE / f64::from(self.0))
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Error parsing a `m:ss` pace string.
#[derive(Debug, thiserror::Error)]
#[error("invalid pace '{0}': expected m:ss per mile")]
pub struct ParsePaceError(String);

impl FromStr for Pace {
    type Err = ParsePaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePaceError(s.to_string());

        let (minutes, seconds) = s.trim().split_once(':').ok_or_else(invalid)?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        if seconds.len() != 2 {
            return Err(invalid());
        }
        let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
        if seconds >= 60 {
            return Err(invalid());
        }

        // Client-supplied input; keep absurd minute counts from overflowing.
        minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .map(Pace)
            .ok_or_else(invalid)
    }
}

impl Serialize for Pace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert a target pace into a percent of threshold speed.
///
/// `percent = threshold_pace / target_pace × 100` (speed is the reciprocal
/// of pace), rounded to one decimal place — the finest granularity the plan
/// file's two-decimal threshold-speed fractions can distinguish.
///
/// A zero threshold or target pace is `InvalidConfiguration`: no percentage
/// can be derived.
pub fn percent_of_threshold(threshold: Pace, target: Pace) -> Result<f64, AppError> {
    if threshold.seconds_per_mile() == 0 {
        return Err(AppError::InvalidConfiguration(
            "threshold pace must be greater than zero".to_string(),
        ));
    }
    if target.seconds_per_mile() == 0 {
        return Err(AppError::InvalidConfiguration(
            "target pace must be greater than zero".to_string(),
        ));
    }

    let percent =
        f64::from(threshold.seconds_per_mile()) / f64::from(target.seconds_per_mile()) * 100.0;
    Ok(round_to_tenth(percent))
}

/// Round to the one-decimal precision the device format accepts.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
