//! Vehicle data API trait

use async_trait::async_trait;

use crate::client::models::{
    ChargeState, ClimateState, DriveState, GuiSettings, VehicleConfig, VehicleData, VehicleState,
    VehicleSummary,
};
use crate::error::ApiResult;

/// Read operations for vehicle telemetry.
///
/// Every call takes the access token explicitly; the client never holds a
/// credential of its own. An unknown or deleted vehicle is reported as
/// [`ApiError::NotFound`](crate::error::ApiError::NotFound).
#[async_trait]
pub trait VehicleDataApi: Send + Sync {
    /// List vehicles on the account
    async fn list_vehicles(&self, access_token: &str) -> ApiResult<Vec<VehicleSummary>>;

    // ========================================================================
    // Per-group reads
    // ========================================================================

    async fn drive_state(&self, access_token: &str, vehicle_id: &str) -> ApiResult<DriveState>;

    async fn charge_state(&self, access_token: &str, vehicle_id: &str)
    -> ApiResult<ChargeState>;

    async fn climate_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<ClimateState>;

    async fn vehicle_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleState>;

    async fn gui_settings(&self, access_token: &str, vehicle_id: &str)
    -> ApiResult<GuiSettings>;

    async fn vehicle_config(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleConfig>;

    // ========================================================================
    // Bulk read
    // ========================================================================

    /// Fetch every data group in one round-trip
    async fn vehicle_data(&self, access_token: &str, vehicle_id: &str) -> ApiResult<VehicleData>;
}
