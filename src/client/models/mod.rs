//! Vehicle API data models
//!
//! Domain types returned by the vehicle API, organized by resource.
//! Fields the API may omit (asleep vehicles, older firmware) are optional.

mod auth;
mod settings;
mod state;
mod vehicle;

pub use auth::TokenResponse;
pub use settings::{GuiSettings, VehicleConfig};
pub use state::{ChargeState, ClimateState, DriveState, VehicleState};
pub use vehicle::{VehicleData, VehicleSummary};
