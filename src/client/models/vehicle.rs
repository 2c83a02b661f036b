//! Vehicle listing and bulk data models

use serde::{Deserialize, Serialize};

use super::settings::{GuiSettings, VehicleConfig};
use super::state::{ChargeState, ClimateState, DriveState, VehicleState};

/// Vehicle as returned by the account vehicle list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Vehicle ID used in API paths
    #[serde(rename = "id_s")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<u64>,

    pub vin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Connectivity state: online, asleep, offline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Every data group in one response.
///
/// Groups the vehicle did not report are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    #[serde(rename = "id_s")]
    pub id: String,

    #[serde(default)]
    pub vin: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_state: Option<DriveState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_state: Option<ChargeState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate_state: Option<ClimateState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_state: Option<VehicleState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gui_settings: Option<GuiSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_config: Option<VehicleConfig>,
}
