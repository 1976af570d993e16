// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod builder;
pub mod wahoo;

pub use builder::{SubmitOutcome, UploadService};
pub use wahoo::{WahooClient, WahooUser};
