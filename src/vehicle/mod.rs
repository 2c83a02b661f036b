//! Per-vehicle facade over the cached data groups
//!
//! Every getter holds a read permit for the whole lookup, so a fetch never
//! runs with a token that renewal is about to replace.

mod fanout;

pub use fanout::fan_out;

use std::sync::Arc;

use log::debug;

use crate::client::VehicleDataApi;
use crate::client::models::{
    ChargeState, ClimateState, DriveState, GuiSettings, VehicleConfig, VehicleData, VehicleState,
    VehicleSummary,
};
use crate::error::{ApiError, Error, Result, SessionError};
use crate::session::{CachePolicy, CredentialLifecycle, TimeWindowedCache};

/// One cache per data group, plus the bulk bundle
pub struct VehicleCaches {
    pub drive_state: TimeWindowedCache<DriveState, ApiError>,
    pub charge_state: TimeWindowedCache<ChargeState, ApiError>,
    pub climate_state: TimeWindowedCache<ClimateState, ApiError>,
    pub vehicle_state: TimeWindowedCache<VehicleState, ApiError>,
    pub gui_settings: TimeWindowedCache<GuiSettings, ApiError>,
    pub vehicle_config: TimeWindowedCache<VehicleConfig, ApiError>,
    pub vehicle_data: TimeWindowedCache<VehicleData, ApiError>,
}

impl VehicleCaches {
    /// Fast window for live telemetry, slow window for settings and config.
    pub fn new(policy: &CachePolicy) -> Self {
        Self {
            drive_state: TimeWindowedCache::new("drive_state", policy.fast()),
            charge_state: TimeWindowedCache::new("charge_state", policy.fast()),
            climate_state: TimeWindowedCache::new("climate_state", policy.fast()),
            vehicle_state: TimeWindowedCache::new("vehicle_state", policy.fast()),
            gui_settings: TimeWindowedCache::new("gui_settings", policy.slow()),
            vehicle_config: TimeWindowedCache::new("vehicle_config", policy.slow()),
            vehicle_data: TimeWindowedCache::new("vehicle_data", policy.fast()),
        }
    }

    /// Rebind every cache to `policy`'s windows; cached values are kept.
    pub fn rebind(&self, policy: &CachePolicy) {
        self.drive_state.set_window(policy.fast());
        self.charge_state.set_window(policy.fast());
        self.climate_state.set_window(policy.fast());
        self.vehicle_state.set_window(policy.fast());
        self.gui_settings.set_window(policy.slow());
        self.vehicle_config.set_window(policy.slow());
        self.vehicle_data.set_window(policy.fast());
    }
}

/// Cached view of one vehicle.
///
/// Built by [`Session`](crate::session::Session); shares the session's
/// credential lifecycle and, until [`set_policy`](Self::set_policy) is
/// called, its freshness windows.
pub struct Vehicle<C> {
    id: String,
    summary: Option<VehicleSummary>,
    client: Arc<C>,
    lifecycle: Arc<CredentialLifecycle>,
    caches: VehicleCaches,
}

impl<C: VehicleDataApi> Vehicle<C> {
    pub(crate) fn new(
        id: String,
        summary: Option<VehicleSummary>,
        client: Arc<C>,
        lifecycle: Arc<CredentialLifecycle>,
        policy: &CachePolicy,
    ) -> Self {
        Self {
            id,
            summary,
            client,
            lifecycle,
            caches: VehicleCaches::new(policy),
        }
    }

    pub async fn drive_state(&self) -> Result<DriveState> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .drive_state
            .get_or_fetch(|| self.client.drive_state(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn charge_state(&self) -> Result<ChargeState> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .charge_state
            .get_or_fetch(|| self.client.charge_state(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn climate_state(&self) -> Result<ClimateState> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .climate_state
            .get_or_fetch(|| self.client.climate_state(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn vehicle_state(&self) -> Result<VehicleState> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .vehicle_state
            .get_or_fetch(|| self.client.vehicle_state(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn gui_settings(&self) -> Result<GuiSettings> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .gui_settings
            .get_or_fetch(|| self.client.gui_settings(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    pub async fn vehicle_config(&self) -> Result<VehicleConfig> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        self.caches
            .vehicle_config
            .get_or_fetch(|| self.client.vehicle_config(token, &self.id))
            .await
            .map_err(|e| self.translate(e))
    }

    /// Complete data in one round-trip.
    ///
    /// A successful fetch also refreshes every narrower group present in the
    /// bundle, stamped with the bundle's fetch time.
    pub async fn vehicle_data(&self) -> Result<VehicleData> {
        let permit = self.lifecycle.acquire_read_permit().await?;
        let token = permit.current_access_token();
        let caches = &self.caches;
        self.caches
            .vehicle_data
            .get_or_fetch_then(
                || self.client.vehicle_data(token, &self.id),
                |bundle, fetched_at| {
                    let injected = fan_out(bundle, fetched_at, caches);
                    debug!("Fanned out {} groups for vehicle {}", injected, self.id);
                },
            )
            .await
            .map_err(|e| self.translate(e))
    }
}

impl<C> Vehicle<C> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Listing entry this facade was built from, if any
    pub fn summary(&self) -> Option<&VehicleSummary> {
        self.summary.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.summary.as_ref()?.display_name.as_deref()
    }

    /// Move this facade's caches onto another policy's windows
    pub fn set_policy(&self, policy: &CachePolicy) {
        self.caches.rebind(policy);
    }

    pub fn caches(&self) -> &VehicleCaches {
        &self.caches
    }

    fn translate(&self, err: ApiError) -> Error {
        match err {
            ApiError::NotFound(_) => SessionError::VehicleNotFound(self.id.clone()).into(),
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockVehicleClient;
    use crate::session::{Session, SessionSettings};
    use std::time::Duration;

    fn bundle(battery: i32) -> VehicleData {
        VehicleData {
            id: "1".to_string(),
            drive_state: Some(DriveState {
                speed: Some(30),
                ..Default::default()
            }),
            charge_state: Some(ChargeState {
                battery_level: Some(battery),
                ..Default::default()
            }),
            gui_settings: Some(GuiSettings {
                gui_distance_units: Some("km/hr".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    async fn session_with(client: &Arc<MockVehicleClient>) -> Session<MockVehicleClient> {
        Session::login(client.clone(), "a@b.c", "pw", SessionSettings::default())
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_getter_served_from_cache_within_window() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(50)).await);
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(50));
        client.set_vehicle_data("1", bundle(49)).await;

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(50));
        assert_eq!(client.call_counts().await.charge_state, 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(49));
        assert_eq!(client.call_counts().await.charge_state, 2);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_groups_outlive_fast_window() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(50)).await);
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        car.gui_settings().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        car.gui_settings().await.unwrap();

        assert_eq!(client.call_counts().await.gui_settings, 1);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_vehicle_is_not_found_and_not_cached() {
        let client = Arc::new(MockVehicleClient::new());
        let session = session_with(&client).await;
        let car = session.vehicle("404");

        let err = car.drive_state().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::VehicleNotFound(ref id)) if id == "404"
        ));

        car.drive_state().await.unwrap_err();
        assert_eq!(client.call_counts().await.drive_state, 2);
        assert!(car.caches().drive_state.peek().is_none());
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_not_masked_by_stale_value() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(70)).await);
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        car.charge_state().await.unwrap();
        tokio::time::sleep(Duration::from_secs(11)).await;

        client
            .fail_next(ApiError::VehicleUnavailable("asleep".to_string()))
            .await;
        let err = car.charge_state().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::VehicleUnavailable(_))));

        // The stale entry survives the failure
        assert_eq!(
            car.caches().charge_state.peek().and_then(|c| c.battery_level),
            Some(70)
        );
        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(70));
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_getters_share_one_fetch() {
        let client = Arc::new(
            MockVehicleClient::new()
                .with_vehicle_data("1", bundle(33))
                .await
                .with_latency(Duration::from_secs(2))
                .await,
        );
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        let (a, b, c) = tokio::join!(car.charge_state(), car.charge_state(), car.charge_state());

        for result in [a, b, c] {
            assert_eq!(result.unwrap().battery_level, Some(33));
        }
        assert_eq!(client.call_counts().await.charge_state, 1);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_getters_share_one_failure() {
        let client = Arc::new(
            MockVehicleClient::new()
                .with_vehicle_data("1", bundle(33))
                .await
                .with_latency(Duration::from_secs(2))
                .await
                .with_error(ApiError::ServerError("boom".to_string()))
                .await,
        );
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        let (a, b) = tokio::join!(car.climate_state(), car.climate_state());

        assert!(matches!(a, Err(Error::Api(ApiError::ServerError(_)))));
        assert!(matches!(b, Err(Error::Api(ApiError::ServerError(_)))));
        assert_eq!(client.call_counts().await.climate_state, 1);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_fetch_warms_narrow_getters() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(90)).await);
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        let data = car.vehicle_data().await.unwrap();
        assert_eq!(data.charge_state.and_then(|c| c.battery_level), Some(90));

        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(90));
        assert_eq!(car.drive_state().await.unwrap().speed, Some(30));
        assert_eq!(
            car.gui_settings().await.unwrap().gui_distance_units.as_deref(),
            Some("km/hr")
        );

        let counts = client.call_counts().await;
        assert_eq!(counts.vehicle_data, 1);
        assert_eq!(counts.charge_state, 0);
        assert_eq!(counts.drive_state, 0);
        assert_eq!(counts.gui_settings, 0);

        // Groups absent from the bundle still fetch on their own
        car.climate_state().await.unwrap();
        assert_eq!(client.call_counts().await.climate_state, 1);
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_cache_hit_does_not_fan_out_again() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(90)).await);
        let session = session_with(&client).await;
        let car = session.vehicle("1");

        car.vehicle_data().await.unwrap();
        car.caches().charge_state.inject(ChargeState {
            battery_level: Some(12),
            ..Default::default()
        });

        car.vehicle_data().await.unwrap();
        assert_eq!(car.charge_state().await.unwrap().battery_level, Some(12));
        session.close();
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_policy_rebinds_one_facade() {
        let client = Arc::new(MockVehicleClient::new().with_vehicle_data("1", bundle(5)).await);
        let session = session_with(&client).await;
        let eager = session.vehicle("1");
        let normal = session.vehicle("1");

        let always_stale = CachePolicy::new(Duration::ZERO, Duration::ZERO);
        eager.set_policy(&always_stale);

        eager.charge_state().await.unwrap();
        eager.charge_state().await.unwrap();
        normal.charge_state().await.unwrap();
        normal.charge_state().await.unwrap();

        assert_eq!(client.call_counts().await.charge_state, 3);
        assert!(
            eager
                .caches()
                .charge_state
                .window()
                .shares_cell_with(always_stale.fast())
        );
        session.close();
    }
}
