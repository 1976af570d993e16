// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! KICKR Planner: build interval running workouts and push them to a
//! connected treadmill through the Wahoo Cloud.
//!
//! This crate provides the backend API for composing an ordered interval
//! plan, converting pace targets to percent-of-threshold-speed, and
//! uploading the plan via OAuth2.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use models::SessionStore;
use services::UploadService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub upload_service: UploadService,
}
