//! Authentication models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::session::Credential;

/// OAuth token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Issue time as Unix seconds (absent on some token servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Convert into a validated credential.
    ///
    /// `received_at` stands in for the issue time when the server omits
    /// `created_at`.
    pub fn into_credential(self, received_at: DateTime<Utc>) -> Result<Credential, SessionError> {
        let issued_at = match self.created_at {
            Some(secs) => DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                SessionError::InvalidCredential(format!("invalid created_at {}", secs))
            })?,
            None => received_at,
        };

        let lifetime = Duration::try_seconds(self.expires_in).ok_or_else(|| {
            SessionError::InvalidCredential(format!("invalid expires_in {}", self.expires_in))
        })?;

        Credential::with_lifetime(self.access_token, self.refresh_token, issued_at, lifetime)
    }
}
