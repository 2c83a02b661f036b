//! API trait definitions split by responsibility
//!
//! This module organizes the vehicle API surface into focused sub-traits:
//! - [`AuthApi`] - Login and token refresh
//! - [`VehicleDataApi`] - Vehicle discovery and per-group data reads
//!
//! The [`VehicleApi`](super::VehicleApi) super-trait combines both.

mod auth;
mod data;

pub use auth::AuthApi;
pub use data::VehicleDataApi;
