// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST adapter for the community backend.
//!
//! Each [`RemoteSync`] call is one request. The session's bearer token is
//! attached when present; the backend decides what needs it.

use crate::auth::AuthContext;
use crate::config::Config;
use crate::error::{AppError, SyncError};
use crate::models::{EntityId, FlagKind, NewReview, ProgressEvent, Review};
use crate::sync::RemoteSync;
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// HTTP implementation of [`RemoteSync`].
#[derive(Clone)]
pub struct HttpSync {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthContext>,
}

impl HttpSync {
    pub fn new(config: &Config, auth: Arc<dyn AuthContext>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Exchange email and password for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are both required".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/api/members/login", self.base_url))
            .json(&serde_json::json!({ "email": email.trim(), "password": password }))
            .send()
            .await
            .map_err(|e| AppError::SyncFailed(e.into()))?;

        let body: RawLoginResponse = Self::check_response_json(response)
            .await
            .map_err(AppError::SyncFailed)?;

        let token = body.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            AppError::SyncFailed(SyncError::Decode(
                "login response has no access token".to_string(),
            ))
        })?;

        tracing::info!(role = ?body.role, "Login succeeded");
        Ok(LoginResponse {
            token,
            role: body.role,
        })
    }

    fn entity_url(&self, entity: &EntityId, suffix: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            entity.kind.collection(),
            urlencoding::encode(&entity.id),
            suffix
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check response status and return error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 {
            tracing::warn!("Backend rejected credentials (401)");
            return Err(SyncError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        Self::check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteSync for HttpSync {
    async fn get_favorite_status(&self, entity: &EntityId) -> Result<bool, SyncError> {
        let url = self.entity_url(entity, FlagKind::Favorite.as_str());
        let response = self.authorized(self.http.get(&url)).send().await?;

        // The backend answers `null` when nothing is stored yet.
        let status: Option<FavoriteStatus> = Self::check_response_json(response).await?;
        Ok(status.map(|s| s.is_favorite).unwrap_or(false))
    }

    async fn set_flag(
        &self,
        entity: &EntityId,
        kind: FlagKind,
        value: bool,
    ) -> Result<(), SyncError> {
        let url = self.entity_url(entity, kind.as_str());
        let request = if value {
            self.http.post(&url)
        } else {
            self.http.delete(&url)
        };

        let response = self.authorized(request).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn submit_review(
        &self,
        entity: &EntityId,
        review: &NewReview,
    ) -> Result<Review, SyncError> {
        let url = self.entity_url(entity, "reviews");
        let response = self
            .authorized(self.http.post(&url))
            .json(review)
            .send()
            .await?;
        Self::check_response_json(response).await
    }

    async fn list_reviews(&self, entity: &EntityId) -> Result<Vec<Review>, SyncError> {
        let url = self.entity_url(entity, "reviews");
        let response = self.authorized(self.http.get(&url)).send().await?;
        let reviews: Option<Vec<Review>> = Self::check_response_json(response).await?;
        Ok(reviews.unwrap_or_default())
    }

    async fn record_course_event(&self, event: &ProgressEvent) -> Result<(), SyncError> {
        let url = self.entity_url(&EntityId::course(event.course_id.as_str()), "events");
        let body = serde_json::json!({
            "event": event.kind.name(),
            "stopIndex": event.kind.stop_index(),
            "at": format_utc_rfc3339(event.at),
        });

        let response = self
            .authorized(self.http.post(&url))
            .json(&body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteStatus {
    #[serde(default)]
    is_favorite: bool,
}

#[derive(Deserialize)]
struct RawLoginResponse {
    token: Option<String>,
    role: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    /// Backend role, e.g. "RESIDENT"
    pub role: Option<String>,
}
