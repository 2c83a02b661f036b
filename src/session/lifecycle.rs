//! Credential lifecycle with proactive background renewal
//!
//! The current [`Credential`] sits behind a shared/exclusive gate. Data
//! fetches hold a [`ReadPermit`] for as long as they use the access token;
//! renewal takes the exclusive side, so it waits for running reads to drain
//! and holds new ones back only for the duration of the refresh call and swap.
//!
//! A single background task sleeps until `expires_at - refresh_skew` and then
//! renews. A failed renewal disarms the timer: a rejected refresh token does
//! not become valid again, so only an explicit [`CredentialLifecycle::renew`]
//! re-arms it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{RwLock, RwLockReadGuard, watch};
use tokio::task::JoinHandle;

use super::credential::Credential;
use crate::client::AuthApi;
use crate::error::{ApiError, SessionError};

/// Shortest sleep the background timer accepts right after it renewed, so a
/// credential whose lifetime is shorter than the skew cannot cause a tight
/// refresh loop. The first deadline of a schedule is honored as is.
pub const MIN_RENEWAL_DELAY: Duration = Duration::from_secs(5);

/// Exchanges a refresh token for a new credential.
#[async_trait]
pub trait CredentialRenewer: Send + Sync {
    async fn renew(&self, refresh_token: &str) -> Result<Credential, ApiError>;
}

#[async_trait]
impl<T: AuthApi + ?Sized> CredentialRenewer for T {
    async fn renew(&self, refresh_token: &str) -> Result<Credential, ApiError> {
        self.refresh(refresh_token).await
    }
}

type SuccessCallback = Box<dyn Fn(&Credential) + Send + Sync>;
type FailureCallback = Box<dyn Fn(&SessionError) + Send + Sync>;

/// Callbacks notified after every renewal attempt
struct RenewalSubscription {
    on_success: SuccessCallback,
    on_failure: FailureCallback,
}

/// Shared permit to use the current credential.
///
/// The credential cannot change while any permit is alive; dropping the
/// permit releases it.
pub struct ReadPermit<'a> {
    guard: RwLockReadGuard<'a, Credential>,
}

impl ReadPermit<'_> {
    /// Access token as of permit acquisition
    pub fn current_access_token(&self) -> &str {
        self.guard.access_token()
    }

    pub fn credential(&self) -> &Credential {
        &self.guard
    }
}

/// Owns the session credential and keeps it renewed.
pub struct CredentialLifecycle {
    credential: RwLock<Credential>,
    renewer: Arc<dyn CredentialRenewer>,
    refresh_skew: chrono::Duration,
    subscription: Mutex<Option<RenewalSubscription>>,
    /// Next scheduled renewal; `None` while disarmed
    schedule: watch::Sender<Option<DateTime<Utc>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl CredentialLifecycle {
    /// Take ownership of `initial` and start the renewal timer.
    ///
    /// If `initial` is already within `refresh_skew` of its expiry it is
    /// renewed before this returns, and a failure of that renewal is returned.
    /// Must be called from within a tokio runtime.
    pub async fn start(
        initial: Credential,
        renewer: Arc<dyn CredentialRenewer>,
        refresh_skew: Duration,
    ) -> Result<Arc<Self>, SessionError> {
        let refresh_skew = chrono::Duration::from_std(refresh_skew).map_err(|_| {
            SessionError::InvalidCredential("refresh skew out of range".to_string())
        })?;
        let deadline = initial.renewal_deadline(refresh_skew);
        let (schedule, schedule_rx) = watch::channel(None);

        let lifecycle = Arc::new(Self {
            credential: RwLock::new(initial),
            renewer,
            refresh_skew,
            subscription: Mutex::new(None),
            schedule,
            timer: Mutex::new(None),
            closed: AtomicBool::new(false),
        });

        let first_floor = if deadline <= Utc::now() {
            info!("Credential is inside its renewal window, renewing before start");
            lifecycle.renew().await?;
            MIN_RENEWAL_DELAY
        } else {
            lifecycle.schedule.send_replace(Some(deadline));
            Duration::ZERO
        };

        let handle = tokio::spawn(run_timer(
            Arc::downgrade(&lifecycle),
            schedule_rx,
            first_floor,
        ));
        *lock(&lifecycle.timer) = Some(handle);

        Ok(lifecycle)
    }

    /// Acquire a shared permit to read the credential.
    ///
    /// Waits only while a renewal holds the exclusive side.
    pub async fn acquire_read_permit(&self) -> Result<ReadPermit<'_>, SessionError> {
        self.ensure_open()?;
        let guard = self.credential.read().await;
        self.ensure_open()?;
        Ok(ReadPermit { guard })
    }

    /// Renew the credential now.
    ///
    /// Waits for outstanding read permits, calls the renewer with the current
    /// refresh token and swaps in the result. On success the subscriber is
    /// told and the timer re-armed against the new expiry; on failure the
    /// subscriber is told, the error logged, and the timer left disarmed while
    /// the last credential keeps being served.
    ///
    /// Subscriber callbacks run while the exclusive permit is held and must
    /// not acquire a read permit themselves.
    pub async fn renew(&self) -> Result<Credential, SessionError> {
        self.ensure_open()?;
        let mut credential = self.credential.write().await;
        // close() may have run while we queued for the exclusive side
        self.ensure_open()?;

        debug!(
            "Renewing credential (current expires {})",
            credential.expires_at().to_rfc3339()
        );

        match self.renewer.renew(credential.refresh_token()).await {
            Ok(renewed) => {
                *credential = renewed.clone();
                info!(
                    "Credential renewed, valid until {}",
                    renewed.expires_at().to_rfc3339()
                );

                if let Some(subscription) = lock(&self.subscription).as_ref() {
                    (subscription.on_success)(&renewed);
                }
                if !self.is_closed() {
                    self.schedule
                        .send_replace(Some(renewed.renewal_deadline(self.refresh_skew)));
                }
                Ok(renewed)
            }
            Err(cause) => {
                let err = SessionError::Renewal(cause);
                error!("{}; automatic renewal stopped", err);

                match lock(&self.subscription).as_ref() {
                    Some(subscription) => (subscription.on_failure)(&err),
                    None => warn!(
                        "No renewal subscriber registered; continuing with credential expiring {}",
                        credential.expires_at().to_rfc3339()
                    ),
                }
                self.schedule.send_replace(None);
                Err(err)
            }
        }
    }

    /// Register the renewal callbacks, replacing any earlier registration.
    pub fn subscribe<S, F>(&self, on_success: S, on_failure: F)
    where
        S: Fn(&Credential) + Send + Sync + 'static,
        F: Fn(&SessionError) + Send + Sync + 'static,
    {
        let previous = lock(&self.subscription).replace(RenewalSubscription {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        });
        if previous.is_some() {
            debug!("Replaced existing renewal subscription");
        }
    }

    /// When the background timer will next renew, if it is armed
    pub fn next_renewal(&self) -> Option<DateTime<Utc>> {
        *self.schedule.borrow()
    }

    pub fn refresh_skew(&self) -> Duration {
        self.refresh_skew.to_std().unwrap_or_default()
    }

    /// Stop the background timer. Idempotent.
    ///
    /// After this returns the timer never fires, and read permits and
    /// renewals fail with [`SessionError::Closed`]. Fetches already holding a
    /// permit are not interrupted.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.schedule.send_replace(None);
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
        info!("Credential lifecycle closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Drop for CredentialLifecycle {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

/// Background timer: sleeps until the scheduled deadline, renews, repeats.
///
/// `floor` bounds the first sleep from below; it is `MIN_RENEWAL_DELAY` when
/// `start` has just renewed.
///
/// Holds only a weak reference so that dropping the last session handle ends
/// the task.
async fn run_timer(
    lifecycle: Weak<CredentialLifecycle>,
    mut schedule: watch::Receiver<Option<DateTime<Utc>>>,
    mut floor: Duration,
) {
    // Every schedule after the first one follows a renewal

    loop {
        let next = *schedule.borrow_and_update();

        let Some(deadline) = next else {
            debug!("Credential renewal timer disarmed");
            if schedule.changed().await.is_err() {
                return;
            }
            floor = MIN_RENEWAL_DELAY;
            continue;
        };

        let delay = (deadline - Utc::now())
            .to_std()
            .unwrap_or_default()
            .max(floor);
        debug!("Next credential renewal in {}ms", delay.as_millis());

        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                let Some(lifecycle) = lifecycle.upgrade() else {
                    return;
                };
                // Failures are logged and reported to the subscriber inside renew()
                let _ = lifecycle.renew().await;
                floor = MIN_RENEWAL_DELAY;
            }
            changed = schedule.changed() => {
                if changed.is_err() {
                    return;
                }
                floor = MIN_RENEWAL_DELAY;
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
