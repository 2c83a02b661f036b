//! Display models for CLI output

pub mod display;

pub use display::{FieldDisplay, GroupSnapshot, VehicleDisplay};
