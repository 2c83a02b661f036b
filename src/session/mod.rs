//! Session layer: credential lifecycle plus per-vehicle cached data
//!
//! A [`Session`] owns one [`CredentialLifecycle`] and one [`CachePolicy`] and
//! hands both to every [`Vehicle`] facade it builds, so all facades of a
//! session share the token and the freshness windows.

mod cache;
mod credential;
mod freshness;
mod lifecycle;

pub use cache::TimeWindowedCache;
pub use credential::Credential;
pub use freshness::{CachePolicy, FreshnessDefaults, FreshnessWindow};
pub use lifecycle::{CredentialLifecycle, CredentialRenewer, MIN_RENEWAL_DELAY, ReadPermit};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::client::VehicleApi;
use crate::error::{Result, SessionError};
use crate::vehicle::Vehicle;

/// Default lead time before expiry at which the credential is renewed
pub const DEFAULT_REFRESH_SKEW: Duration = Duration::from_secs(5 * 60);

/// Tunables applied when a session starts
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub refresh_skew: Duration,
    pub fast_window: Duration,
    pub slow_window: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            refresh_skew: DEFAULT_REFRESH_SKEW,
            fast_window: FreshnessDefaults::FAST,
            slow_window: FreshnessDefaults::SLOW,
        }
    }
}

/// An authenticated session against the vehicle API
pub struct Session<C> {
    client: Arc<C>,
    lifecycle: Arc<CredentialLifecycle>,
    policy: CachePolicy,
}

impl<C: VehicleApi + 'static> Session<C> {
    /// Log in with account credentials and start the renewal timer.
    pub async fn login(
        client: Arc<C>,
        email: &str,
        password: &str,
        settings: SessionSettings,
    ) -> Result<Self> {
        debug!("Authenticating {}", email);
        let credential = client.authenticate(email, password).await?;
        info!("Logged in as {}", email);
        Self::resume(client, credential, settings).await
    }

    /// Start from a previously stored credential.
    ///
    /// A credential already inside the refresh skew is renewed before this
    /// returns.
    pub async fn resume(
        client: Arc<C>,
        credential: Credential,
        settings: SessionSettings,
    ) -> Result<Self> {
        let renewer: Arc<dyn CredentialRenewer> = client.clone();
        let lifecycle =
            CredentialLifecycle::start(credential, renewer, settings.refresh_skew).await?;

        Ok(Self {
            client,
            lifecycle,
            policy: CachePolicy::new(settings.fast_window, settings.slow_window),
        })
    }

    /// List the account's vehicles, one facade each.
    pub async fn vehicles(&self) -> Result<Vec<Vehicle<C>>> {
        let summaries = {
            let permit = self.lifecycle.acquire_read_permit().await?;
            self.client
                .list_vehicles(permit.current_access_token())
                .await?
        };
        debug!("Found {} vehicles", summaries.len());

        Ok(summaries
            .into_iter()
            .map(|summary| {
                Vehicle::new(
                    summary.id.clone(),
                    Some(summary),
                    Arc::clone(&self.client),
                    Arc::clone(&self.lifecycle),
                    &self.policy,
                )
            })
            .collect())
    }

    /// Facade for a known vehicle id, without listing.
    ///
    /// An unknown id surfaces as [`SessionError::VehicleNotFound`] on the
    /// first read.
    pub fn vehicle(&self, id: impl Into<String>) -> Vehicle<C> {
        Vehicle::new(
            id.into(),
            None,
            Arc::clone(&self.client),
            Arc::clone(&self.lifecycle),
            &self.policy,
        )
    }
}

impl<C> Session<C> {
    /// Freshness windows shared by every facade of this session
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn lifecycle(&self) -> &Arc<CredentialLifecycle> {
        &self.lifecycle
    }

    /// Snapshot of the current credential
    pub async fn credential(&self) -> std::result::Result<Credential, SessionError> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        Ok(permit.credential().clone())
    }

    /// Register callbacks for every renewal outcome, replacing earlier ones.
    ///
    /// Callbacks run while renewal holds the credential exclusively; they
    /// must not read vehicle data.
    pub fn subscribe_to_renewal<S, F>(&self, on_success: S, on_failure: F)
    where
        S: Fn(&Credential) + Send + Sync + 'static,
        F: Fn(&SessionError) + Send + Sync + 'static,
    {
        self.lifecycle.subscribe(on_success, on_failure);
    }

    /// Renew the credential now and re-arm the timer.
    pub async fn renew(&self) -> std::result::Result<Credential, SessionError> {
        self.lifecycle.renew().await
    }

    /// Stop background renewal. Idempotent.
    pub fn close(&self) {
        self.lifecycle.close();
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle.is_closed()
    }
}
