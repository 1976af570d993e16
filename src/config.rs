//! Application configuration loaded from environment variables.
//!
//! Secrets (the Wahoo client secret and signing keys) are read once at
//! startup and cached in memory; they are never embedded in the binary.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Wahoo OAuth client ID (public)
    pub wahoo_client_id: String,
    /// Redirect URI registered with the Wahoo application
    pub wahoo_redirect_uri: String,
    /// Frontend URL for post-OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Timeout applied to every outbound Wahoo call, in seconds
    pub http_timeout_secs: u64,

    // --- Secrets ---
    /// Wahoo OAuth client secret
    pub wahoo_client_secret: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, secrets can come from a `.env` file; in
    /// production they are injected into the environment by the deployment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            wahoo_client_id: env::var("WAHOO_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("WAHOO_CLIENT_ID"))?,
            wahoo_redirect_uri: env::var("WAHOO_REDIRECT_URI")
                .map_err(|_| ConfigError::Missing("WAHOO_REDIRECT_URI"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECS"))?,

            wahoo_client_secret: env::var("WAHOO_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WAHOO_CLIENT_SECRET"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            wahoo_client_id: "test_client_id".to_string(),
            wahoo_redirect_uri: "http://localhost:8080/auth/wahoo/callback".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            http_timeout_secs: 5,
            wahoo_client_secret: "test_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("WAHOO_CLIENT_ID", "test_id");
        env::set_var("WAHOO_CLIENT_SECRET", "test_secret");
        env::set_var("WAHOO_REDIRECT_URI", "https://localhost/callback");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("OAUTH_STATE_KEY", "test_state_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.wahoo_client_id, "test_id");
        assert_eq!(config.wahoo_client_secret, "test_secret");
        assert_eq!(config.port, 8080);
        assert_eq!(config.http_timeout_secs, 15);
    }
}
