// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_TIMEOUT_MS: u64 = 10_000;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the community backend (no trailing slash)
    pub api_base_url: String,
    /// Per-request timeout for backend calls
    pub api_timeout: Duration,
    /// Bearer credential to start the session with, if any
    pub api_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local use.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_timeout_ms = match env::var("API_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("API_TIMEOUT_MS", raw))?,
            Err(_) => DEFAULT_API_TIMEOUT_MS,
        };

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            api_timeout: Duration::from_millis(api_timeout_ms),
            api_token: env::var("API_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Config for tests, pointing at a local backend.
    pub fn test_default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout: Duration::from_millis(2_000),
            api_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
