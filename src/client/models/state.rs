//! Fast-changing vehicle state groups

use serde::{Deserialize, Serialize};

/// Position and motion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveState {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub heading: Option<i32>,
    /// Speed in mph, `None` when parked
    pub speed: Option<i32>,
    /// P, R, N, D or `None` when asleep
    pub shift_state: Option<String>,
    pub power: Option<i32>,
    /// Unix seconds of the last GPS fix
    pub gps_as_of: Option<i64>,
    /// Unix milliseconds when the vehicle reported this group
    pub timestamp: Option<i64>,
}

/// Battery and charging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeState {
    pub battery_level: Option<i32>,
    pub usable_battery_level: Option<i32>,
    /// Rated range in miles
    pub battery_range: Option<f64>,
    pub charge_limit_soc: Option<i32>,
    /// Charging, Complete, Disconnected, Stopped, ...
    pub charging_state: Option<String>,
    pub charger_power: Option<i32>,
    pub charge_rate: Option<f64>,
    pub time_to_full_charge: Option<f64>,
    pub charge_port_door_open: Option<bool>,
    pub timestamp: Option<i64>,
}

/// Cabin climate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateState {
    /// Celsius
    pub inside_temp: Option<f64>,
    pub outside_temp: Option<f64>,
    pub driver_temp_setting: Option<f64>,
    pub passenger_temp_setting: Option<f64>,
    pub is_climate_on: Option<bool>,
    pub is_preconditioning: Option<bool>,
    pub fan_status: Option<i32>,
    pub timestamp: Option<i64>,
}

/// Locks, doors, software and odometer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleState {
    pub locked: Option<bool>,
    pub odometer: Option<f64>,
    pub car_version: Option<String>,
    pub sentry_mode: Option<bool>,
    pub is_user_present: Option<bool>,
    /// Non-zero when the driver front door is open
    pub df: Option<i32>,
    pub pf: Option<i32>,
    pub dr: Option<i32>,
    pub pr: Option<i32>,
    pub timestamp: Option<i64>,
}
