//! JSON output: the payload under `data`, context under `meta`

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::{GroupSnapshot, VehicleDisplay};

/// Envelope printed for `--format json`
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a, T: Serialize + ?Sized> {
    pub data: &'a T,
    pub meta: JsonMeta,
}

/// Context for scripts consuming the output
#[derive(Debug, Default, Serialize)]
pub struct JsonMeta {
    /// fleetop version that produced the output
    pub version: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,

    /// Data group name, e.g. `charge_state`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl JsonMeta {
    fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            ..Default::default()
        }
    }
}

/// Vehicle list with its length in `meta.count`
pub fn vehicles(rows: &[VehicleDisplay]) -> Result<String, serde_json::Error> {
    let meta = JsonMeta {
        count: Some(rows.len()),
        ..JsonMeta::new()
    };
    serde_json::to_string_pretty(&JsonOutput { data: rows, meta })
}

/// Group payload as returned by the API; vehicle, group and read time in `meta`
pub fn snapshot(snapshot: &GroupSnapshot) -> Result<String, serde_json::Error> {
    let meta = JsonMeta {
        vehicle_id: Some(snapshot.vehicle_id.clone()),
        group: Some(snapshot.group),
        read_at: Some(snapshot.read_at),
        ..JsonMeta::new()
    };
    serde_json::to_string_pretty(&JsonOutput::<Value> {
        data: &snapshot.data,
        meta,
    })
}
