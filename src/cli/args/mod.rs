//! Shared CLI argument types

mod common;
mod global;

pub use common::{DataGroup, OutputFormat};
pub use global::GlobalOptions;
