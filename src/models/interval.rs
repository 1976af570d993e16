// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interval workout model: an ordered sequence of typed segments.
//!
//! The order of intervals is the execution order on the treadmill and is
//! preserved unchanged from form input through the uploaded plan file.

use crate::error::AppError;
use crate::models::pace::{Pace, MAX_PERCENT};
use serde::{Deserialize, Serialize};

/// Segment type, mapped to the intensity codes the plan format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Warmup,
    Active,
    Recovery,
    Cooldown,
}

impl IntervalKind {
    /// Intensity type code in the plan file.
    pub fn wire_code(&self) -> &'static str {
        match self {
            IntervalKind::Warmup => "wu",
            IntervalKind::Active => "active",
            IntervalKind::Recovery => "recover",
            IntervalKind::Cooldown => "cd",
        }
    }
}

/// Intensity target for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Target pace per mile, converted to a percentage at upload time.
    Pace(Pace),
    /// Percent of threshold speed, used as-is (no conversion).
    Percent(f64),
}

/// One timed block of a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub name: String,
    pub kind: IntervalKind,
    pub duration_secs: u32,
    pub target: Target,
}

/// A plan-level invariant violation found by [`WorkoutPlan::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("plan has no Active interval")]
    NoActiveInterval,

    #[error("interval {index} has zero duration")]
    ZeroDuration { index: usize },

    #[error("interval {index} has a non-positive pace")]
    NonPositivePace { index: usize },

    #[error("interval {index} percent target {percent} is outside (0, 200]")]
    PercentOutOfRange { index: usize, percent: f64 },
}

/// Ordered interval sequence plus the workout name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub name: String,
    pub intervals: Vec<Interval>,
}

impl Default for WorkoutPlan {
    fn default() -> Self {
        Self {
            name: "My KICKR Run".to_string(),
            intervals: Vec::new(),
        }
    }
}

impl WorkoutPlan {
    /// Append an interval at the end of the sequence.
    pub fn append(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    /// Remove the interval at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Interval, AppError> {
        if index >= self.intervals.len() {
            return Err(AppError::BadRequest(format!(
                "interval index {} out of range (plan has {})",
                index,
                self.intervals.len()
            )));
        }
        Ok(self.intervals.remove(index))
    }

    /// Swap the intervals at positions `a` and `b`.
    pub fn reorder(&mut self, a: usize, b: usize) -> Result<(), AppError> {
        let len = self.intervals.len();
        if a >= len || b >= len {
            return Err(AppError::BadRequest(format!(
                "reorder indices {}/{} out of range (plan has {})",
                a, b, len
            )));
        }
        self.intervals.swap(a, b);
        Ok(())
    }

    /// Check every plan invariant and return all violations at once, so the
    /// caller can report the full list instead of the first failure.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if !self
            .intervals
            .iter()
            .any(|i| i.kind == IntervalKind::Active)
        {
            violations.push(Violation::NoActiveInterval);
        }

        for (index, interval) in self.intervals.iter().enumerate() {
            if interval.duration_secs == 0 {
                violations.push(Violation::ZeroDuration { index });
            }
            match interval.target {
                Target::Pace(pace) if pace.seconds_per_mile() == 0 => {
                    violations.push(Violation::NonPositivePace { index });
                }
                Target::Percent(percent) if percent <= 0.0 || percent > MAX_PERCENT => {
                    violations.push(Violation::PercentOutOfRange { index, percent });
                }
                _ => {}
            }
        }

        violations
    }

    pub fn total_duration_secs(&self) -> u32 {
        self.intervals.iter().map(|i| i.duration_secs).sum()
    }
}
