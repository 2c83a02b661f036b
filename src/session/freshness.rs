//! Shared freshness windows for cached vehicle data

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default freshness per class of data.
///
/// Fast-changing groups (position, charge, climate, door/lock state) go stale
/// quickly while the car is in use; configuration and display settings
/// almost never change.
pub struct FreshnessDefaults;

impl FreshnessDefaults {
    pub const FAST: Duration = Duration::from_secs(10); // 10 sec
    pub const SLOW: Duration = Duration::from_secs(10 * 60); // 10 min
}

/// A mutable, shareable maximum age for cached values.
///
/// Cloning yields another handle to the same cell, so every cache holding a
/// clone sees a [`set`](Self::set) from then on.
#[derive(Clone)]
pub struct FreshnessWindow {
    millis: Arc<AtomicU64>,
}

impl FreshnessWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(to_millis(window))),
        }
    }

    /// Current window
    pub fn get(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Acquire))
    }

    /// Change the window for every holder of this cell
    pub fn set(&self, window: Duration) {
        self.millis.store(to_millis(window), Ordering::Release);
    }

    /// Check if both handles point at the same cell
    pub fn shares_cell_with(&self, other: &FreshnessWindow) -> bool {
        Arc::ptr_eq(&self.millis, &other.millis)
    }
}

impl fmt::Debug for FreshnessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FreshnessWindow").field(&self.get()).finish()
    }
}

fn to_millis(window: Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX)
}

/// The pair of windows a session hands to its vehicle caches
#[derive(Debug, Clone)]
pub struct CachePolicy {
    fast: FreshnessWindow,
    slow: FreshnessWindow,
}

impl CachePolicy {
    pub fn new(fast: Duration, slow: Duration) -> Self {
        Self {
            fast: FreshnessWindow::new(fast),
            slow: FreshnessWindow::new(slow),
        }
    }

    /// Window used by fast-changing groups
    pub fn fast(&self) -> &FreshnessWindow {
        &self.fast
    }

    /// Window used by slow-changing groups
    pub fn slow(&self) -> &FreshnessWindow {
        &self.slow
    }

    pub fn set_fast(&self, window: Duration) {
        self.fast.set(window);
    }

    pub fn set_slow(&self, window: Duration) {
        self.slow.set(window);
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(FreshnessDefaults::FAST, FreshnessDefaults::SLOW)
    }
}
