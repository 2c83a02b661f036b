//! Vehicle API client

pub mod api;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::{AuthApi, VehicleDataApi};
pub use http::{ClientCredentials, VehicleClient};
#[cfg(test)]
pub use mock::MockVehicleClient;

/// Complete vehicle API surface consumed by the session layer.
///
/// Implemented automatically for anything providing both sub-traits.
pub trait VehicleApi: AuthApi + VehicleDataApi {}

impl<T: AuthApi + VehicleDataApi> VehicleApi for T {}
