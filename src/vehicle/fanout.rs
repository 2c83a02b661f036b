//! Write-through from a complete-data bundle into the per-group caches

use tokio::time::Instant;

use super::VehicleCaches;
use crate::client::models::VehicleData;
use crate::session::TimeWindowedCache;

/// Inject every group present in `bundle` into its cache, stamped with the
/// bundle's fetch time.
///
/// A cache already holding a value fetched after `fetched_at` keeps it.
/// Returns how many caches took the new value.
pub fn fan_out(bundle: &VehicleData, fetched_at: Instant, caches: &VehicleCaches) -> usize {
    [
        offer(&caches.drive_state, &bundle.drive_state, fetched_at),
        offer(&caches.charge_state, &bundle.charge_state, fetched_at),
        offer(&caches.climate_state, &bundle.climate_state, fetched_at),
        offer(&caches.vehicle_state, &bundle.vehicle_state, fetched_at),
        offer(&caches.gui_settings, &bundle.gui_settings, fetched_at),
        offer(&caches.vehicle_config, &bundle.vehicle_config, fetched_at),
    ]
    .into_iter()
    .filter(|stored| *stored)
    .count()
}

fn offer<T: Clone, E: Clone>(
    cache: &TimeWindowedCache<T, E>,
    value: &Option<T>,
    at: Instant,
) -> bool {
    match value {
        Some(value) => cache.inject_at(value.clone(), at),
        None => false,
    }
}
