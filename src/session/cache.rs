//! Single-entry, time-windowed cache with single-flight fetching
//!
//! Each vehicle data group gets one [`TimeWindowedCache`]. A value is served
//! while it is younger than the cache's [`FreshnessWindow`]; otherwise the
//! supplied fetch runs, with at most one fetch in flight per entry.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

use super::freshness::FreshnessWindow;

/// Holds zero or one value and the instant it was fetched.
pub struct TimeWindowedCache<T, E> {
    name: &'static str,
    window: RwLock<FreshnessWindow>,
    slot: Mutex<Slot<T, E>>,
    // Held for the duration of a fetch; never held together with `slot` across an await.
    flight: tokio::sync::Mutex<()>,
}

struct Slot<T, E> {
    value: Option<T>,
    fetched_at: Option<Instant>,
    /// Number of fetches that have run to completion (success or failure)
    completed_fetches: u64,
    /// Error of the most recent fetch, tagged with its completion number
    last_failure: Option<(u64, E)>,
}

impl<T: Clone, E> Slot<T, E> {
    fn fresh_value(&self, now: Instant, window: Duration) -> Option<T> {
        let fetched_at = self.fetched_at?;
        if now.saturating_duration_since(fetched_at) < window {
            self.value.clone()
        } else {
            None
        }
    }
}

impl<T: Clone, E: Clone> TimeWindowedCache<T, E> {
    /// Create an empty cache reading its freshness from `window`.
    ///
    /// `name` only appears in log lines.
    pub fn new(name: &'static str, window: &FreshnessWindow) -> Self {
        Self {
            name,
            window: RwLock::new(window.clone()),
            slot: Mutex::new(Slot {
                value: None,
                fetched_at: None,
                completed_fetches: 0,
                last_failure: None,
            }),
            flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Handle to the window this cache currently consults
    pub fn window(&self) -> FreshnessWindow {
        self.window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebind to another shared window. The stored value is kept.
    pub fn set_window(&self, window: &FreshnessWindow) {
        *self.window.write().unwrap_or_else(PoisonError::into_inner) = window.clone();
    }

    /// Stored value regardless of age
    pub fn peek(&self) -> Option<T> {
        self.lock_slot().value.clone()
    }

    /// When the stored value was fetched, if there is one
    pub fn fetched_at(&self) -> Option<Instant> {
        self.lock_slot().fetched_at
    }

    /// Check if a value younger than the window is stored
    pub fn is_fresh(&self) -> bool {
        let window = self.window().get();
        self.lock_slot().fresh_value(Instant::now(), window).is_some()
    }

    /// Return the cached value if fresh, otherwise run `fetch` and store its result.
    ///
    /// Callers that find the entry stale while another fetch is in flight wait
    /// for it and receive its outcome, value or error, instead of fetching
    /// again. A failed fetch leaves the entry untouched.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_fetch_then(fetch, |_, _| {}).await
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch), calling `on_fetched` with the
    /// value and its fetch instant whenever this call ran a successful fetch.
    ///
    /// `on_fetched` runs before any waiter is released.
    pub async fn get_or_fetch_then<F, Fut, S>(&self, fetch: F, on_fetched: S) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        S: FnOnce(&T, Instant),
    {
        let now = Instant::now();
        let window = self.window().get();

        let observed = {
            let slot = self.lock_slot();
            if let Some(value) = slot.fresh_value(now, window) {
                debug!("Cache hit: {}", self.name);
                return Ok(value);
            }
            slot.completed_fetches
        };

        let _flight = self.flight.lock().await;

        {
            let slot = self.lock_slot();
            if slot.completed_fetches > observed {
                // Another caller fetched while we waited; share its outcome.
                if let Some((fetch_no, err)) = &slot.last_failure
                    && *fetch_no == slot.completed_fetches
                {
                    debug!("Cache {}: sharing failed fetch with waiter", self.name);
                    return Err(err.clone());
                }
                if let Some(value) = &slot.value {
                    debug!("Cache {}: sharing fetched value with waiter", self.name);
                    return Ok(value.clone());
                }
            }
            if let Some(value) = slot.fresh_value(now, window) {
                return Ok(value);
            }
        }

        debug!("Cache miss: {}", self.name);
        let result = fetch().await;

        let mut slot = self.lock_slot();
        slot.completed_fetches += 1;
        match result {
            Ok(value) => {
                if slot.fetched_at.is_some_and(|at| at > now) {
                    debug!(
                        "Cache {}: newer value injected during fetch, keeping it",
                        self.name
                    );
                } else {
                    slot.value = Some(value.clone());
                    slot.fetched_at = Some(now);
                }
                drop(slot);
                on_fetched(&value, now);
                Ok(value)
            }
            Err(err) => {
                let fetch_no = slot.completed_fetches;
                slot.last_failure = Some((fetch_no, err.clone()));
                Err(err)
            }
        }
    }

    /// Store `value` as fetched now, bypassing the fetch function.
    pub fn inject(&self, value: T) {
        self.inject_at(value, Instant::now());
    }

    /// Store `value` as fetched at `at`, unless the entry already holds a
    /// value fetched later. Returns whether the value was stored.
    pub fn inject_at(&self, value: T, at: Instant) -> bool {
        let mut slot = self.lock_slot();
        if slot.fetched_at.is_some_and(|existing| existing > at) {
            debug!("Cache {}: ignoring injection older than stored value", self.name);
            return false;
        }
        slot.value = Some(value);
        slot.fetched_at = Some(at);
        true
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot<T, E>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
