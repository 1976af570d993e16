// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use kickr_planner::config::Config;
use kickr_planner::models::{Credential, Session, TokenResponse};
use kickr_planner::routes::create_router;
use kickr_planner::services::{UploadService, WahooClient};
use kickr_planner::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Create a test credential expiring `expires_in` seconds from now.
#[allow(dead_code)]
pub fn test_credential(expires_in: i64) -> Credential {
    Credential::from_token_response(
        TokenResponse {
            access_token: "test_access_token".to_string(),
            refresh_token: Some("test_refresh_token".to_string()),
            expires_in,
        },
        Utc::now(),
    )
}

/// Create a test JWT for a session id.
#[allow(dead_code)]
pub fn create_test_jwt(session_id: &str, signing_key: &[u8]) -> String {
    kickr_planner::middleware::auth::create_jwt(session_id, signing_key).unwrap()
}

/// Create a test app with no live Wahoo backend.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_base_urls(None)
}

/// Create a test app whose Wahoo client points at the given base URL
/// (a stub server), or at the real host when `None`.
#[allow(dead_code)]
pub fn create_test_app_with_base_urls(base_url: Option<&str>) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let mut client = WahooClient::new(
        config.wahoo_client_id.clone(),
        config.wahoo_client_secret.clone(),
        config.wahoo_redirect_uri.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )
    .unwrap();
    if let Some(base) = base_url {
        client = client.with_base_urls(&format!("{}/v1", base), &format!("{}/oauth", base));
    }

    let state = Arc::new(AppState {
        config,
        sessions: Arc::new(dashmap::DashMap::new()),
        upload_service: UploadService::new(client),
    });

    (create_router(state.clone()), state)
}

/// Insert a session with the given credential and return its id and a JWT
/// accepted by the auth middleware.
#[allow(dead_code)]
pub fn insert_session(state: &Arc<AppState>, credential: Credential) -> (String, String) {
    let session_id = uuid::Uuid::new_v4().to_string();
    state
        .sessions
        .insert(session_id.clone(), Session::new(credential));
    let jwt = create_test_jwt(&session_id, &state.config.jwt_signing_key);
    (session_id, jwt)
}
