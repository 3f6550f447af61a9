//! Bearer token claim decoding.
//!
//! The remote API issues JWTs. The client never verifies signatures (the
//! server does that on every request); it only decodes the payload segment
//! to derive the role of the active identity. The decoded claim is the
//! single source of truth for authorization-sensitive UI paths — the role
//! field stored on the profile is display-only.

use crate::error::Error;
use crate::types::Role;
use base64::Engine;
use serde::Deserialize;

/// Claims embedded in a bearer token payload
///
/// Unknown claims are ignored; every field is optional since token shapes
/// vary across server versions.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Subject user identifier
    #[serde(default, alias = "sub")]
    pub id: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Role claim, when present
    #[serde(default)]
    pub role: Option<Role>,
    /// Legacy admin flag, used when no role claim is present
    #[serde(default)]
    pub is_admin: Option<bool>,
    /// Expiry as a Unix timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying its signature
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] when the token is not a three-segment JWT,
    /// the payload is not valid base64url, or the claims are not JSON.
    pub fn decode(token: &str) -> Result<Self, Error> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| Error::Token("token is not a JWT".to_string()))?;

        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| Error::Token(format!("invalid payload encoding: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Token(format!("invalid claims JSON: {e}")))
    }

    /// The role this token grants
    ///
    /// Prefers the explicit role claim, falls back to the legacy admin
    /// flag, and defaults to [`Role::User`].
    #[must_use]
    pub fn derived_role(&self) -> Role {
        if let Some(role) = self.role {
            return role;
        }
        match self.is_admin {
            Some(true) => Role::Admin,
            _ => Role::User,
        }
    }
}
