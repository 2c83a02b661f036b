//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::client::models::VehicleSummary;

/// Vehicle display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct VehicleDisplay {
    #[tabled(rename = "VEHICLE ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "VIN")]
    pub vin: String,

    #[tabled(rename = "STATE")]
    pub state: String,
}

impl From<&VehicleSummary> for VehicleDisplay {
    fn from(v: &VehicleSummary) -> Self {
        Self {
            id: v.id.clone(),
            name: v.display_name.clone().unwrap_or_else(|| "--".to_string()),
            vin: v.vin.clone(),
            state: v.state.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// One field of a data group, flattened for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FieldDisplay {
    #[tabled(rename = "FIELD")]
    pub field: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

/// A data group read at one point in time.
///
/// `data` is the group serialized to JSON so every group shares one
/// rendering path.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSnapshot {
    pub vehicle_id: String,
    pub group: &'static str,
    /// When the facade handed the value out; cached reads keep their own age
    pub read_at: DateTime<Utc>,
    pub data: Value,
}

impl GroupSnapshot {
    pub fn new<T: Serialize>(
        vehicle_id: &str,
        group: &'static str,
        value: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            vehicle_id: vehicle_id.to_string(),
            group,
            read_at: Utc::now(),
            data: serde_json::to_value(value)?,
        })
    }

    /// Flatten into `path = value` rows, skipping absent fields.
    ///
    /// Nested groups (the complete bundle) use dotted paths.
    pub fn fields(&self) -> Vec<FieldDisplay> {
        let mut rows = Vec::new();
        flatten("", &self.data, &mut rows);
        rows
    }
}

fn flatten(prefix: &str, value: &Value, rows: &mut Vec<FieldDisplay>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, rows);
            }
        }
        Value::String(s) => rows.push(FieldDisplay {
            field: prefix.to_string(),
            value: s.clone(),
        }),
        other => rows.push(FieldDisplay {
            field: prefix.to_string(),
            value: other.to_string(),
        }),
    }
}
