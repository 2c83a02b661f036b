//! fleetop - session layer and CLI for the vehicle owner API
//!
//! The core is [`session::Session`]: it owns a self-renewing credential and
//! hands out [`vehicle::Vehicle`] facades whose data getters are cached per
//! group and deduplicated across concurrent callers.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod session;
pub mod vehicle;
