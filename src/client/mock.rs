//! Mock vehicle API client for testing
//!
//! Provides an in-memory implementation of the API traits so the session
//! and vehicle layers can be tested without a server.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::api::{AuthApi, VehicleDataApi};
use super::models::{
    ChargeState, ClimateState, DriveState, GuiSettings, VehicleConfig, VehicleData, VehicleState,
    VehicleSummary,
};
use crate::error::{ApiError, ApiResult};
use crate::session::Credential;

/// Mock API client for testing.
///
/// Configure vehicles and responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockVehicleClient::new()
///     .with_vehicle_data("1", VehicleData { ... })
///     .await;
///
/// let charge = mock.charge_state("token", "1").await?;
/// ```
pub struct MockVehicleClient {
    /// Vehicles to return from list_vehicles
    vehicles: Arc<Mutex<Vec<VehicleSummary>>>,
    /// Data bundles keyed by vehicle id; unknown ids answer NotFound
    bundles: Arc<Mutex<HashMap<String, VehicleData>>>,
    /// Error for the next data call (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Error for the next refresh (if any) - consumed on first use
    refresh_error: Arc<Mutex<Option<ApiError>>>,
    /// Simulated round-trip time for data calls
    latency: Arc<Mutex<Duration>>,
    /// Lifetime of credentials issued by authenticate and refresh
    token_lifetime: Arc<Mutex<chrono::Duration>>,
    /// Number of credentials issued so far
    issued: Arc<Mutex<usize>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Access tokens presented to data calls, in order
    captured_tokens: Arc<Mutex<Vec<String>>>,
}

impl Default for MockVehicleClient {
    fn default() -> Self {
        Self {
            vehicles: Arc::new(Mutex::new(Vec::new())),
            bundles: Arc::new(Mutex::new(HashMap::new())),
            error: Arc::new(Mutex::new(None)),
            refresh_error: Arc::new(Mutex::new(None)),
            latency: Arc::new(Mutex::new(Duration::ZERO)),
            token_lifetime: Arc::new(Mutex::new(chrono::Duration::hours(1))),
            issued: Arc::new(Mutex::new(0)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub authenticate: usize,
    pub refresh: usize,
    pub list_vehicles: usize,
    pub drive_state: usize,
    pub charge_state: usize,
    pub climate_state: usize,
    pub vehicle_state: usize,
    pub gui_settings: usize,
    pub vehicle_config: usize,
    pub vehicle_data: usize,
}

impl CallCounts {
    /// Total number of data calls (everything except authenticate/refresh).
    pub fn data_calls(&self) -> usize {
        self.list_vehicles
            + self.drive_state
            + self.charge_state
            + self.climate_state
            + self.vehicle_state
            + self.gui_settings
            + self.vehicle_config
            + self.vehicle_data
    }

    /// Total number of API calls made.
    pub fn total(&self) -> usize {
        self.authenticate + self.refresh + self.data_calls()
    }
}

impl MockVehicleClient {
    /// Create a new mock client with no vehicles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the account's vehicle list.
    pub async fn with_vehicles(self, vehicles: Vec<VehicleSummary>) -> Self {
        *self.vehicles.lock().await = vehicles;
        self
    }

    /// Register a vehicle's data bundle.
    pub async fn with_vehicle_data(self, vehicle_id: &str, data: VehicleData) -> Self {
        self.set_vehicle_data(vehicle_id, data).await;
        self
    }

    /// Configure an error to return on the next data call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        self.fail_next(error).await;
        self
    }

    /// Configure an error to return on the next refresh.
    pub async fn with_refresh_error(self, error: ApiError) -> Self {
        self.fail_next_refresh(error).await;
        self
    }

    /// Delay every data call by `latency`.
    pub async fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().await = latency;
        self
    }

    /// Lifetime of credentials handed out by authenticate and refresh.
    pub async fn with_token_lifetime(self, lifetime: chrono::Duration) -> Self {
        *self.token_lifetime.lock().await = lifetime;
        self
    }

    /// Replace a vehicle's data bundle mid-test.
    pub async fn set_vehicle_data(&self, vehicle_id: &str, data: VehicleData) {
        self.bundles
            .lock()
            .await
            .insert(vehicle_id.to_string(), data);
    }

    /// Make the next data call fail.
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Make the next refresh fail.
    pub async fn fail_next_refresh(&self, error: ApiError) {
        *self.refresh_error.lock().await = Some(error);
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Access tokens seen by data calls, oldest first.
    pub async fn captured_tokens(&self) -> Vec<String> {
        self.captured_tokens.lock().await.clone()
    }

    /// Issue the next credential in sequence.
    async fn issue(&self) -> Credential {
        let n = {
            let mut issued = self.issued.lock().await;
            let n = *issued;
            *issued += 1;
            n
        };
        let lifetime = *self.token_lifetime.lock().await;

        Credential::with_lifetime(
            format!("access-{}", n),
            format!("refresh-{}", n),
            Utc::now(),
            lifetime,
        )
        .unwrap_or_else(|e| panic!("mock token lifetime must be positive: {}", e))
    }

    /// Common prelude for data calls: record, consume a pending error, wait.
    async fn begin_data_call(&self, access_token: &str) -> ApiResult<()> {
        self.captured_tokens
            .lock()
            .await
            .push(access_token.to_string());

        // Failures arrive after the round-trip too
        let latency = *self.latency.lock().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.error.lock().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn bundle(&self, vehicle_id: &str) -> ApiResult<VehicleData> {
        self.bundles
            .lock()
            .await
            .get(vehicle_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("vehicle {}", vehicle_id)))
    }
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockVehicleClient {
    async fn authenticate(&self, _email: &str, password: &str) -> ApiResult<Credential> {
        self.call_count.lock().await.authenticate += 1;

        if password.is_empty() {
            return Err(ApiError::Unauthorized);
        }
        Ok(self.issue().await)
    }

    async fn refresh(&self, _refresh_token: &str) -> ApiResult<Credential> {
        self.call_count.lock().await.refresh += 1;

        if let Some(e) = self.refresh_error.lock().await.take() {
            return Err(e);
        }
        Ok(self.issue().await)
    }
}

// ============================================================================
// VehicleDataApi Implementation
// ============================================================================

#[async_trait]
impl VehicleDataApi for MockVehicleClient {
    async fn list_vehicles(&self, access_token: &str) -> ApiResult<Vec<VehicleSummary>> {
        self.call_count.lock().await.list_vehicles += 1;
        self.begin_data_call(access_token).await?;

        Ok(self.vehicles.lock().await.clone())
    }

    async fn drive_state(&self, access_token: &str, vehicle_id: &str) -> ApiResult<DriveState> {
        self.call_count.lock().await.drive_state += 1;
        self.begin_data_call(access_token).await?;

        Ok(self.bundle(vehicle_id).await?.drive_state.unwrap_or_default())
    }

    async fn charge_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<ChargeState> {
        self.call_count.lock().await.charge_state += 1;
        self.begin_data_call(access_token).await?;

        Ok(self.bundle(vehicle_id).await?.charge_state.unwrap_or_default())
    }

    async fn climate_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<ClimateState> {
        self.call_count.lock().await.climate_state += 1;
        self.begin_data_call(access_token).await?;

        Ok(self
            .bundle(vehicle_id)
            .await?
            .climate_state
            .unwrap_or_default())
    }

    async fn vehicle_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleState> {
        self.call_count.lock().await.vehicle_state += 1;
        self.begin_data_call(access_token).await?;

        Ok(self
            .bundle(vehicle_id)
            .await?
            .vehicle_state
            .unwrap_or_default())
    }

    async fn gui_settings(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<GuiSettings> {
        self.call_count.lock().await.gui_settings += 1;
        self.begin_data_call(access_token).await?;

        Ok(self.bundle(vehicle_id).await?.gui_settings.unwrap_or_default())
    }

    async fn vehicle_config(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleConfig> {
        self.call_count.lock().await.vehicle_config += 1;
        self.begin_data_call(access_token).await?;

        Ok(self
            .bundle(vehicle_id)
            .await?
            .vehicle_config
            .unwrap_or_default())
    }

    async fn vehicle_data(&self, access_token: &str, vehicle_id: &str) -> ApiResult<VehicleData> {
        self.call_count.lock().await.vehicle_data += 1;
        self.begin_data_call(access_token).await?;

        self.bundle(vehicle_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(battery: i32) -> VehicleData {
        VehicleData {
            id: "1".to_string(),
            charge_state: Some(ChargeState {
                battery_level: Some(battery),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_client_default_empty() {
        let mock = MockVehicleClient::new();

        let vehicles = mock.list_vehicles("t").await.unwrap();
        assert!(vehicles.is_empty());

        let err = mock.charge_state("t", "1").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mock_client_serves_groups_from_bundle() {
        let mock = MockVehicleClient::new()
            .with_vehicle_data("1", bundle(64))
            .await;

        let charge = mock.charge_state("t", "1").await.unwrap();
        assert_eq!(charge.battery_level, Some(64));

        // Missing groups come back empty rather than failing
        let drive = mock.drive_state("t", "1").await.unwrap();
        assert_eq!(drive, DriveState::default());
    }

    #[tokio::test]
    async fn test_mock_client_with_error() {
        let mock = MockVehicleClient::new()
            .with_vehicle_data("1", bundle(10))
            .await
            .with_error(ApiError::VehicleUnavailable("asleep".to_string()))
            .await;

        assert!(mock.vehicle_data("t", "1").await.is_err());

        // Error is consumed, next call succeeds
        assert!(mock.vehicle_data("t", "1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_client_error_arrives_after_latency() {
        let mock = MockVehicleClient::new()
            .with_vehicle_data("1", bundle(10))
            .await
            .with_latency(Duration::from_secs(2))
            .await
            .with_error(ApiError::ServerError("boom".to_string()))
            .await;

        let early = tokio::time::timeout(Duration::from_secs(1), mock.charge_state("t", "1")).await;
        assert!(early.is_err(), "failure should not short-circuit the round-trip");
    }

    #[tokio::test]
    async fn test_mock_client_issues_sequential_credentials() {
        let mock = MockVehicleClient::new();

        let first = mock.authenticate("a@b.c", "pw").await.unwrap();
        let second = mock.refresh(first.refresh_token()).await.unwrap();

        assert_eq!(first.access_token(), "access-0");
        assert_eq!(second.access_token(), "access-1");
        assert_eq!(second.refresh_token(), "refresh-1");

        let counts = mock.call_counts().await;
        assert_eq!(counts.authenticate, 1);
        assert_eq!(counts.refresh, 1);
        assert_eq!(counts.data_calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_client_refresh_error_consumed() {
        let mock = MockVehicleClient::new()
            .with_refresh_error(ApiError::Unauthorized)
            .await;

        assert!(matches!(
            mock.refresh("r").await,
            Err(ApiError::Unauthorized)
        ));
        assert!(mock.refresh("r").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_client_captures_tokens() {
        let mock = MockVehicleClient::new()
            .with_vehicle_data("1", bundle(1))
            .await;

        mock.charge_state("tok-a", "1").await.unwrap();
        mock.gui_settings("tok-b", "1").await.unwrap();

        assert_eq!(mock.captured_tokens().await, vec!["tok-a", "tok-b"]);
        assert_eq!(mock.call_counts().await.total(), 2);
    }
}
