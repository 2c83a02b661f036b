//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod context;
pub mod init;
pub mod status;
pub mod vehicle;

pub use args::{DataGroup, OutputFormat};
pub use context::CommandContext;

/// fleetop - command-line companion for the vehicle owner API
#[derive(Parser, Debug)]
#[command(name = "fleetop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "FLEETOP_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "FLEETOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the default vehicle
    #[arg(long, global = true, env = "FLEETOP_VEHICLE", hide_env = true)]
    pub vehicle: Option<String>,

    /// Custom API host (development/testing)
    #[arg(long, global = true, env = "FLEETOP_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "FLEETOP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and write the configuration file
    Init,

    /// Show credential and configuration status
    Status,

    /// Display version information
    Version,

    /// Read vehicle data
    #[command(subcommand)]
    Vehicle(VehicleCommands),
}

/// Vehicle subcommands
#[derive(Subcommand, Debug)]
pub enum VehicleCommands {
    /// List vehicles on the account
    List,

    /// Read one data group
    Get {
        /// Data group to read
        #[arg(value_enum)]
        group: DataGroup,
    },

    /// Poll a data group, served from cache while it is fresh
    Watch {
        /// Data group to read
        #[arg(value_enum)]
        group: DataGroup,

        /// Seconds between reads
        #[arg(long, default_value_t = 5)]
        interval: u64,

        /// Stop after this many reads (default: until Ctrl-C)
        #[arg(long)]
        count: Option<u64>,
    },
}
