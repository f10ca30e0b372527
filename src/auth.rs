// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication context for the session.
//!
//! The backend issues a JWT on login. We never verify its signature here
//! (the backend does that on every request); the claims are only read to
//! learn the member id and when the credential stops being usable.

use crate::time_utils::unix_now;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Source of the bearer credential used by remote calls.
pub trait AuthContext: Send + Sync {
    /// Whether guarded mutations may proceed.
    fn is_authenticated(&self) -> bool;

    /// Bearer token to attach to backend requests, if any.
    fn bearer_token(&self) -> Option<String>;

    /// Member id of the signed-in user, when known.
    fn member_id(&self) -> Option<String> {
        None
    }
}

/// JWT claims we care about.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (member id)
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Kind of account, from the backend's `role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Visitor,
    Resident,
    BusinessOwner,
}

impl UserType {
    /// Parse a backend role; unknown roles fall back to `Visitor`.
    pub fn from_role(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "resident" => UserType::Resident,
            "business_owner" | "businessowner" | "owner" => UserType::BusinessOwner,
            _ => UserType::Visitor,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    token: Option<String>,
    member_id: Option<String>,
    expires_at: Option<i64>,
    user_type: UserType,
    guest: bool,
}

/// The signed-in user for this app session.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// A signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(token, None);
        session
    }

    /// Store a credential returned by login.
    ///
    /// Opaque (non-JWT) tokens are accepted with unknown expiry.
    pub fn sign_in(&self, token: impl Into<String>, role: Option<&str>) {
        let token = token.into();
        let claims = read_claims(&token);
        if claims.is_none() {
            tracing::debug!("Session token is not a readable JWT; expiry unknown");
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState {
            member_id: claims.as_ref().and_then(|c| c.sub.clone()),
            expires_at: claims.and_then(|c| c.exp),
            token: Some(token),
            user_type: role.map(UserType::from_role).unwrap_or_default(),
            guest: false,
        };
        tracing::info!(member_id = ?state.member_id, user_type = ?state.user_type, "Signed in");
    }

    /// Browse without an account. Guests hold no credential.
    pub fn sign_in_as_guest(&self, user_type: UserType) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState {
            user_type,
            guest: true,
            ..SessionState::default()
        };
        tracing::info!(user_type = ?user_type, "Signed in as guest");
    }

    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState::default();
        tracing::info!("Signed out");
    }

    pub fn user_type(&self) -> UserType {
        self.read().user_type
    }

    pub fn is_guest(&self) -> bool {
        self.read().guest
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthContext for Session {
    fn is_authenticated(&self) -> bool {
        let state = self.read();
        match (&state.token, state.expires_at) {
            (None, _) => false,
            (Some(_), Some(exp)) => unix_now() < exp,
            (Some(_), None) => true,
        }
    }

    fn bearer_token(&self) -> Option<String> {
        if self.is_authenticated() {
            self.read().token.clone()
        } else {
            None
        }
    }

    fn member_id(&self) -> Option<String> {
        self.read().member_id.clone()
    }
}

/// Read JWT claims without checking the signature.
fn read_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}
