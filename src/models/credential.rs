// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential held for the lifetime of one session.
//!
//! Nothing here is persisted; a credential lives in the in-memory session
//! store and dies with the session.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Margin before the recorded expiry at which we treat a token as expired
/// and refresh instead of risking a rejected call.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token endpoint response from Wahoo OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Access/refresh token pair with its expiry.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from a token endpoint response, anchoring the
    /// relative `expires_in` to `now`.
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    /// Whether the access token is expired (or about to be) at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_in: i64, now: DateTime<Utc>) -> Credential {
        Credential::from_token_response(
            TokenResponse {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_in,
            },
            now,
        )
    }

    #[test]
    fn test_fresh_token_is_not_expired() {
        let now = Utc::now();
        assert!(!credential(3600, now).is_expired(now));
    }

    #[test]
    fn test_token_expires_within_margin() {
        let now = Utc::now();
        // 30s left is inside the 60s margin.
        assert!(credential(30, now).is_expired(now));
        assert!(credential(0, now).is_expired(now));
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "abc", "expires_in": 7200}"#,
        )
        .unwrap();
        let cred = Credential::from_token_response(response, Utc::now());
        assert_eq!(cred.access_token, "abc");
        assert!(cred.refresh_token.is_none());
    }
}
