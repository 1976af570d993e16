// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod credential;
pub mod interval;
pub mod pace;
pub mod session;

pub use credential::{Credential, TokenResponse};
pub use interval::{Interval, IntervalKind, Target, Violation, WorkoutPlan};
pub use pace::Pace;
pub use session::{Session, SessionStore};
