// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wahoo Cloud API client.
//!
//! Handles:
//! - OAuth2 authorization-code exchange and refresh
//! - Plan file upload (base64 data URI form post)
//! - Workout scheduling
//! - Connection probing via the user endpoint
//!
//! Every call is bounded by the configured HTTP timeout; a timeout surfaces
//! as `AppError::Timeout`, any other non-2xx API response as
//! `AppError::WahooApi` with the remote body kept verbatim.

use crate::error::AppError;
use crate::models::{Credential, TokenResponse};
use crate::time_utils::format_utc_rfc3339;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth scopes requested at authorization time.
const SCOPES: &str = "workouts_write plans_write user_read";

/// Filename recorded for uploaded plan files.
const PLAN_FILENAME: &str = "kickr_run.json";

/// Wahoo API client.
#[derive(Clone)]
pub struct WahooClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl WahooClient {
    /// Create a new Wahoo client with OAuth credentials.
    ///
    /// `timeout` bounds every outbound call, token exchange included.
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            api_base: "https://api.wahooligan.com/v1".to_string(),
            oauth_base: "https://api.wahooligan.com/oauth".to_string(),
            client_id,
            client_secret,
            redirect_uri,
        })
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_base_urls(mut self, api_base: &str, oauth_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.oauth_base = oauth_base.trim_end_matches('/').to_string();
        self
    }

    /// Build the authorization URL the user is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?client_id={}&redirect_uri={}&scope={}&response_type=code&state={}",
            self.oauth_base,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, AppError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credential, AppError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    /// Form POST to the token endpoint. Any failure here is an OAuth
    /// failure: the caller decides whether to re-prompt for authorization.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Credential, AppError> {
        let url = format!("{}/token", self.oauth_base);
        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("token request: {}", e))
                } else {
                    AppError::Auth(format!("token request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Wahoo token request failed");
            return Err(AppError::Auth(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("malformed token payload: {}", e)))?;

        Ok(Credential::from_token_response(tokens, chrono::Utc::now()))
    }

    /// Get the authenticated Wahoo user. Used as a lightweight probe that
    /// the access token still works.
    pub async fn get_user(&self, access_token: &str) -> Result<WahooUser, AppError> {
        let url = format!("{}/user", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_error(e, "user request"))?;

        self.check_response_json(response).await
    }

    /// Upload a plan file and return the created plan id.
    ///
    /// The plan JSON travels as a base64 `data:` URI in a form field, which
    /// is how the plans endpoint accepts file content.
    pub async fn create_plan(&self, access_token: &str, plan_json: &str) -> Result<u64, AppError> {
        let url = format!("{}/plans", self.api_base);
        let encoded = STANDARD.encode(plan_json.as_bytes());
        let external_id = format!("RUN_{}", chrono::Utc::now().timestamp());

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .form(&[
                (
                    "plan[file]",
                    format!("data:application/json;base64,{}", encoded),
                ),
                ("plan[filename]", PLAN_FILENAME.to_string()),
                ("plan[external_id]", external_id),
                (
                    "plan[provider_updated_at]",
                    format_utc_rfc3339(chrono::Utc::now()),
                ),
            ])
            .send()
            .await
            .map_err(|e| transport_error(e, "plan upload"))?;

        let created: CreatedResource = self.check_response_json(response).await?;
        Ok(created.id)
    }

    /// Schedule a workout for the uploaded plan and return the workout id.
    pub async fn schedule_workout(
        &self,
        access_token: &str,
        plan_id: u64,
        name: &str,
        starts: &str,
        minutes: u32,
    ) -> Result<u64, AppError> {
        let url = format!("{}/workouts", self.api_base);

        // workout_type_id 1 is running
        let body = serde_json::json!({
            "workout": {
                "name": name,
                "starts": starts,
                "plan_id": plan_id,
                "workout_type_id": 1,
                "workout_token": uuid::Uuid::new_v4().to_string(),
                "minutes": minutes,
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, "workout scheduling"))?;

        let created: CreatedResource = self.check_response_json(response).await?;
        Ok(created.id)
    }

    /// Check response status and parse the JSON body, preserving the remote
    /// error body intact on failure.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::WahooApi { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("JSON parse error: {}", e)))
    }
}

/// Map a reqwest transport failure onto the error taxonomy.
fn transport_error(e: reqwest::Error, what: &str) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("{}: {}", what, e))
    } else {
        AppError::Network(format!("{}: {}", what, e))
    }
}

/// Created-resource response from the plans and workouts endpoints.
#[derive(Debug, Clone, Deserialize)]
struct CreatedResource {
    id: u64,
}

/// Authenticated user from the Wahoo user endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WahooUser {
    pub id: u64,
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
