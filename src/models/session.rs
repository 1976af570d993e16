// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory per-user session state.

use crate::models::{Credential, Pace, WorkoutPlan};
use dashmap::DashMap;
use std::sync::Arc;

/// Shared session store, keyed by the session id carried in the JWT.
///
/// Each entry is only touched by requests carrying that session's token, so
/// no locking beyond the map's own sharding is needed.
pub type SessionStore = Arc<DashMap<String, Session>>;

/// Everything one connected user is working on: the OAuth credential from
/// the callback, the plan under construction, and the threshold pace.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub plan: WorkoutPlan,
    pub threshold: Option<Pace>,
}

impl Session {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            plan: WorkoutPlan::default(),
            threshold: None,
        }
    }
}
