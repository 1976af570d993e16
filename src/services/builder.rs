// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan file construction and the upload flow.
//!
//! The upload flow moves through three states: unauthenticated (no usable
//! credential), authenticated (valid access token in hand), submitted (plan
//! uploaded and workout scheduled). An expired credential gets exactly one
//! refresh attempt before the submission call; if that fails the flow stops
//! without touching the plans endpoint, and the caller re-prompts for
//! authorization.

use crate::error::AppError;
use crate::models::pace::MAX_PERCENT;
use crate::models::{pace, Credential, Pace, Target, Violation, WorkoutPlan};
use crate::services::wahoo::WahooClient;
use crate::time_utils::now_local_rfc3339;
use serde::Serialize;

/// Half-width of the target band around the converted percentage, as a
/// fraction of threshold speed. Matches what the head unit expects.
const TARGET_BAND: f64 = 0.02;

/// Plan file JSON, in the shape the KICKR RUN firmware reads.
#[derive(Debug, Serialize)]
pub struct PlanFile {
    pub header: PlanHeader,
    pub intervals: Vec<PlanInterval>,
}

#[derive(Debug, Serialize)]
pub struct PlanHeader {
    pub name: String,
    pub version: String,
    pub description: String,
    pub workout_type_family: u32,
    pub workout_type_location: u32,
    /// Threshold speed in m/s; interval targets are fractions of this.
    pub threshold_speed: f64,
}

#[derive(Debug, Serialize)]
pub struct PlanInterval {
    pub name: String,
    pub exit_trigger_type: String,
    pub exit_trigger_value: u32,
    pub intensity_type: String,
    pub targets: Vec<PlanTarget>,
}

#[derive(Debug, Serialize)]
pub struct PlanTarget {
    #[serde(rename = "type")]
    pub target_type: String,
    pub low: f64,
    pub high: f64,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub plan_id: u64,
    pub workout_id: u64,
    /// Present when the credential was refreshed on the way; the caller
    /// stores it back into the session.
    pub refreshed: Option<Credential>,
}

/// Upload service: validates, converts, uploads, schedules.
///
/// The credential is passed in per call rather than held as state, so a
/// session owns its credential and tests can inject fakes.
#[derive(Clone)]
pub struct UploadService {
    client: WahooClient,
}

impl UploadService {
    pub fn new(client: WahooClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WahooClient {
        &self.client
    }

    /// Submit a plan: refuse on any validation violation before any network
    /// call, refresh the credential once if expired, upload the plan file,
    /// and schedule the workout for today.
    pub async fn submit(
        &self,
        credential: &Credential,
        plan: &WorkoutPlan,
        threshold: Option<Pace>,
    ) -> Result<SubmitOutcome, AppError> {
        let violations = plan.validate();
        if !violations.is_empty() {
            return Err(AppError::PlanInvalid(violations));
        }

        let threshold = threshold.ok_or_else(|| {
            AppError::InvalidConfiguration("threshold pace not set".to_string())
        })?;

        // Built (and therefore converted) before authentication so converter
        // input errors never cost a token refresh.
        let plan_file = build_plan_file(plan, threshold)?;
        let plan_json = serde_json::to_string(&plan_file)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("plan serialization: {}", e)))?;

        let (access_token, refreshed) = if credential.is_expired(chrono::Utc::now()) {
            let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
                AppError::Auth("credential expired and no refresh token held".to_string())
            })?;

            tracing::info!("Access token expired, refreshing before submission");
            let fresh = self.client.refresh(refresh_token).await?;
            (fresh.access_token.clone(), Some(fresh))
        } else {
            (credential.access_token.clone(), None)
        };

        let plan_id = self.client.create_plan(&access_token, &plan_json).await?;

        let minutes = plan.total_duration_secs() / 60;
        let starts = now_local_rfc3339();
        let workout_id = self
            .client
            .schedule_workout(&access_token, plan_id, &plan.name, &starts, minutes)
            .await?;

        tracing::info!(plan_id, workout_id, name = %plan.name, "Plan uploaded and workout scheduled");

        Ok(SubmitOutcome {
            plan_id,
            workout_id,
            refreshed,
        })
    }
}

/// Build the plan file from a validated plan, converting every target into
/// a fraction-of-threshold-speed band. Interval order is kept as-is.
///
/// The device bound on intensity applies to the *converted* value too: a
/// pace target whose percentage lands outside (0, 200] only becomes
/// visible here, after conversion against the session's threshold, and is
/// rejected with the same violation `validate()` reports for direct
/// percent targets. Every offending interval is collected before failing.
pub fn build_plan_file(plan: &WorkoutPlan, threshold: Pace) -> Result<PlanFile, AppError> {
    let mut intervals = Vec::with_capacity(plan.intervals.len());
    let mut violations = Vec::new();

    for (index, interval) in plan.intervals.iter().enumerate() {
        let percent = match interval.target {
            Target::Pace(target) => pace::percent_of_threshold(threshold, target)?,
            Target::Percent(value) => pace::round_to_tenth(value),
        };
        if percent <= 0.0 || percent > MAX_PERCENT {
            violations.push(Violation::PercentOutOfRange { index, percent });
            continue;
        }
        let fraction = percent / 100.0;

        intervals.push(PlanInterval {
            name: interval.name.clone(),
            exit_trigger_type: "time".to_string(),
            exit_trigger_value: interval.duration_secs,
            intensity_type: interval.kind.wire_code().to_string(),
            targets: vec![PlanTarget {
                target_type: "threshold_speed".to_string(),
                // The band must stay non-negative even for tiny targets.
                low: (fraction - TARGET_BAND).max(0.0),
                high: fraction + TARGET_BAND,
            }],
        });
    }

    if !violations.is_empty() {
        return Err(AppError::PlanInvalid(violations));
    }

    Ok(PlanFile {
        header: PlanHeader {
            name: plan.name.clone(),
            version: "1.0.0".to_string(),
            description: "Created via kickr-planner".to_string(),
            workout_type_family: 1,
            workout_type_location: 0,
            threshold_speed: threshold.speed_mps()?,
        },
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Interval, IntervalKind};

    fn sample_plan() -> WorkoutPlan {
        let mut plan = WorkoutPlan {
            name: "Tuesday Intervals".to_string(),
            intervals: Vec::new(),
        };
        plan.append(Interval {
            name: "Warm Up".to_string(),
            kind: IntervalKind::Warmup,
            duration_secs: 300,
            target: Target::Percent(70.0),
        });
        plan.append(Interval {
            name: "Tempo".to_string(),
            kind: IntervalKind::Active,
            duration_secs: 600,
            target: Target::Pace("6:00".parse().unwrap()),
        });
        plan
    }

    #[test]
    fn test_plan_file_preserves_interval_order_and_codes() {
        let threshold: Pace = "7:00".parse().unwrap();
        let file = build_plan_file(&sample_plan(), threshold).unwrap();

        assert_eq!(file.header.name, "Tuesday Intervals");
        let kinds: Vec<&str> = file
            .intervals
            .iter()
            .map(|i| i.intensity_type.as_str())
            .collect();
        assert_eq!(kinds, ["wu", "active"]);
        assert_eq!(file.intervals[1].exit_trigger_value, 600);
    }

    #[test]
    fn test_plan_file_target_band_around_converted_percent() {
        let threshold: Pace = "7:00".parse().unwrap();
        let file = build_plan_file(&sample_plan(), threshold).unwrap();

        // 7:00 threshold at 6:00 target -> 116.7% -> 1.167 fraction
        let tempo = &file.intervals[1].targets[0];
        assert_eq!(tempo.target_type, "threshold_speed");
        assert!((tempo.low - (1.167 - TARGET_BAND)).abs() < 1e-9);
        assert!((tempo.high - (1.167 + TARGET_BAND)).abs() < 1e-9);

        // Direct percent target bypasses conversion.
        let warmup = &file.intervals[0].targets[0];
        assert!((warmup.low - (0.70 - TARGET_BAND)).abs() < 1e-9);
    }

    #[test]
    fn test_converted_percent_outside_device_bound_is_rejected() {
        // 4:00 target against a 14:00 threshold converts to 350%, which no
        // interval target may exceed; validate() cannot see this, only the
        // conversion can.
        let mut plan = WorkoutPlan {
            name: "Over the top".to_string(),
            intervals: Vec::new(),
        };
        plan.append(Interval {
            name: "Warm Up".to_string(),
            kind: IntervalKind::Warmup,
            duration_secs: 300,
            target: Target::Percent(70.0),
        });
        plan.append(Interval {
            name: "Sprint".to_string(),
            kind: IntervalKind::Active,
            duration_secs: 60,
            target: Target::Pace("4:00".parse().unwrap()),
        });
        assert!(plan.validate().is_empty());

        let threshold: Pace = "14:00".parse().unwrap();
        let err = build_plan_file(&plan, threshold).unwrap_err();
        match err {
            AppError::PlanInvalid(violations) => {
                assert_eq!(
                    violations,
                    vec![Violation::PercentOutOfRange {
                        index: 1,
                        percent: 350.0
                    }]
                );
            }
            other => panic!("expected PlanInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_tiny_percent_target_band_is_clamped_at_zero() {
        let mut plan = sample_plan();
        plan.intervals[0].target = Target::Percent(1.0);

        let threshold: Pace = "7:00".parse().unwrap();
        let file = build_plan_file(&plan, threshold).unwrap();

        let warmup = &file.intervals[0].targets[0];
        assert_eq!(warmup.low, 0.0);
        assert!((warmup.high - (0.01 + TARGET_BAND)).abs() < 1e-9);
    }

    #[test]
    fn test_plan_file_header_threshold_speed() {
        let threshold: Pace = "8:00".parse().unwrap();
        let file = build_plan_file(&sample_plan(), threshold).unwrap();
        assert!((file.header.threshold_speed - 1609.34 / 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_target_serializes_type_field() {
        let target = PlanTarget {
            target_type: "threshold_speed".to_string(),
            low: 0.98,
            high: 1.02,
        };
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "threshold_speed");
    }
}
