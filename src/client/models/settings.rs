//! Slow-changing settings and configuration groups

use serde::{Deserialize, Serialize};

/// Units and display preferences chosen on the touchscreen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiSettings {
    pub gui_distance_units: Option<String>,
    pub gui_temperature_units: Option<String>,
    pub gui_charge_rate_units: Option<String>,
    pub gui_24_hour_time: Option<bool>,
    pub gui_range_display: Option<String>,
    pub timestamp: Option<i64>,
}

/// Factory configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub car_type: Option<String>,
    pub trim_badging: Option<String>,
    pub exterior_color: Option<String>,
    pub wheel_type: Option<String>,
    pub has_air_suspension: Option<bool>,
    pub can_accept_navigation_requests: Option<bool>,
    pub timestamp: Option<i64>,
}
