// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan-building API routes for authenticated sessions.
//!
//! All handlers operate on the caller's in-memory session. Mutations take
//! the session's map entry for the duration of the handler; network calls
//! happen only after cloning what they need out of the entry, so a guard is
//! never held across an await.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthSession;
use crate::models::{Credential, Interval, Pace, WorkoutPlan};
use crate::services::WahooUser;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/plan", get(get_plan))
        .route("/api/plan/name", put(put_name))
        .route("/api/plan/threshold", put(put_threshold))
        .route("/api/plan/intervals", post(post_interval))
        .route(
            "/api/plan/intervals/{index}",
            axum::routing::delete(delete_interval),
        )
        .route("/api/plan/intervals/reorder", post(post_reorder))
        .route("/api/plan/upload", post(post_upload))
}

/// Clone the pieces a handler needs out of the session entry.
fn session_snapshot(
    state: &AppState,
    auth: &AuthSession,
) -> Result<(Credential, WorkoutPlan, Option<Pace>)> {
    let session = state
        .sessions
        .get(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    Ok((
        session.credential.clone(),
        session.plan.clone(),
        session.threshold,
    ))
}

// ─── Connection Status ───────────────────────────────────────

/// Current connection response.
#[derive(Serialize)]
pub struct MeResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<WahooUser>,
}

/// Probe the Wahoo API to report whether the session's token still works.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<MeResponse>> {
    let (credential, _, _) = session_snapshot(&state, &auth)?;

    match state
        .upload_service
        .client()
        .get_user(&credential.access_token)
        .await
    {
        Ok(user) => Ok(Json(MeResponse {
            connected: true,
            user: Some(user),
        })),
        Err(AppError::WahooApi { status: 401, .. }) => Ok(Json(MeResponse {
            connected: false,
            user: None,
        })),
        Err(e) => Err(e),
    }
}

// ─── Plan Editing ────────────────────────────────────────────

/// Current plan response.
#[derive(Serialize)]
pub struct PlanResponse {
    pub plan: WorkoutPlan,
    pub threshold: Option<Pace>,
    pub total_duration_secs: u32,
}

fn plan_response(plan: WorkoutPlan, threshold: Option<Pace>) -> Json<PlanResponse> {
    let total_duration_secs = plan.total_duration_secs();
    Json(PlanResponse {
        plan,
        threshold,
        total_duration_secs,
    })
}

/// Get the session's current plan and threshold pace.
async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<PlanResponse>> {
    let (_, plan, threshold) = session_snapshot(&state, &auth)?;
    Ok(plan_response(plan, threshold))
}

#[derive(Deserialize)]
struct NameRequest {
    name: String,
}

/// Rename the workout.
async fn put_name(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<NameRequest>,
) -> Result<Json<PlanResponse>> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "workout name must not be empty".to_string(),
        ));
    }

    let mut session = state
        .sessions
        .get_mut(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    session.plan.name = req.name.trim().to_string();
    Ok(plan_response(session.plan.clone(), session.threshold))
}

#[derive(Deserialize)]
struct ThresholdRequest {
    /// Threshold pace per mile, e.g. "7:30".
    threshold: Pace,
}

/// Set the session's threshold pace.
async fn put_threshold(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<ThresholdRequest>,
) -> Result<Json<PlanResponse>> {
    if req.threshold.seconds_per_mile() == 0 {
        return Err(AppError::InvalidConfiguration(
            "threshold pace must be greater than zero".to_string(),
        ));
    }

    let mut session = state
        .sessions
        .get_mut(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    session.threshold = Some(req.threshold);
    Ok(plan_response(session.plan.clone(), session.threshold))
}

/// Append an interval to the plan.
async fn post_interval(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(interval): Json<Interval>,
) -> Result<Json<PlanResponse>> {
    let mut session = state
        .sessions
        .get_mut(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    session.plan.append(interval);

    tracing::debug!(
        session_id = %auth.session_id,
        intervals = session.plan.intervals.len(),
        "Interval appended"
    );
    Ok(plan_response(session.plan.clone(), session.threshold))
}

/// Remove the interval at `index`.
async fn delete_interval(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Path(index): Path<usize>,
) -> Result<Json<PlanResponse>> {
    let mut session = state
        .sessions
        .get_mut(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    session.plan.remove(index)?;
    Ok(plan_response(session.plan.clone(), session.threshold))
}

#[derive(Deserialize)]
struct ReorderRequest {
    a: usize,
    b: usize,
}

/// Swap two intervals.
async fn post_reorder(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<PlanResponse>> {
    let mut session = state
        .sessions
        .get_mut(&auth.session_id)
        .ok_or(AppError::InvalidToken)?;
    session.plan.reorder(req.a, req.b)?;
    Ok(plan_response(session.plan.clone(), session.threshold))
}

// ─── Upload ──────────────────────────────────────────────────

/// Successful upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub plan_id: u64,
    pub workout_id: u64,
}

/// Validate, convert, upload the plan, and schedule it for today.
async fn post_upload(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Json<UploadResponse>> {
    let (credential, plan, threshold) = session_snapshot(&state, &auth)?;

    let outcome = state
        .upload_service
        .submit(&credential, &plan, threshold)
        .await?;

    // Store a refreshed credential back into the session (if the session
    // was logged out mid-flight there is nothing to update).
    if let Some(fresh) = outcome.refreshed {
        if let Some(mut session) = state.sessions.get_mut(&auth.session_id) {
            session.credential = fresh;
        }
    }

    Ok(Json(UploadResponse {
        plan_id: outcome.plan_id,
        workout_id: outcome.workout_id,
    }))
}
