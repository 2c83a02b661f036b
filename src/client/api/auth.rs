//! Authentication API trait

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::session::Credential;

/// Authentication operations for the vehicle API
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Log in with account email and password
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<Credential>;

    /// Exchange a refresh token for a new credential.
    ///
    /// A rejected refresh token surfaces as [`ApiError::Unauthorized`](crate::error::ApiError::Unauthorized).
    async fn refresh(&self, refresh_token: &str) -> ApiResult<Credential>;
}
