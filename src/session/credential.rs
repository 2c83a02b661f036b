//! Access/refresh token pair with validity window

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// OAuth access and refresh tokens with their issue and expiry instants.
///
/// A credential is immutable once built. Renewal produces a new value that
/// replaces the old one as a whole, so a reader never sees the access token of
/// one credential paired with the refresh token of another.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCredential")]
pub struct Credential {
    access_token: String,
    refresh_token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Unvalidated wire/config shape, checked on the way in
#[derive(Deserialize)]
struct RawCredential {
    access_token: String,
    refresh_token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<RawCredential> for Credential {
    type Error = SessionError;

    fn try_from(raw: RawCredential) -> Result<Self, Self::Error> {
        Credential::new(
            raw.access_token,
            raw.refresh_token,
            raw.issued_at,
            raw.expires_at,
        )
    }
}

impl Credential {
    /// Build a credential, rejecting an expiry that is not strictly after issue.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if expires_at <= issued_at {
            return Err(SessionError::InvalidCredential(format!(
                "expiry {} is not after issue time {}",
                expires_at.to_rfc3339(),
                issued_at.to_rfc3339()
            )));
        }

        Ok(Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            issued_at,
            expires_at,
        })
    }

    /// Build a credential issued `issued_at` and valid for `lifetime`.
    pub fn with_lifetime(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, SessionError> {
        let expires_at = issued_at.checked_add_signed(lifetime).ok_or_else(|| {
            SessionError::InvalidCredential(format!(
                "lifetime of {}s overflows the expiry instant",
                lifetime.num_seconds()
            ))
        })?;
        Self::new(access_token, refresh_token, issued_at, expires_at)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Total validity period
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    /// Check if the access token has already expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Instant at which a proactive renewal should happen, `skew` ahead of expiry.
    ///
    /// A skew reaching past the earliest representable instant clamps to it,
    /// which makes the credential due immediately.
    pub fn renewal_deadline(&self, skew: Duration) -> DateTime<Utc> {
        self.expires_at
            .checked_sub_signed(skew)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if `now` is already inside the renewal window
    pub fn needs_renewal(&self, skew: Duration) -> bool {
        self.renewal_deadline(skew) <= Utc::now()
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
