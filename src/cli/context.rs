//! Command execution context
//!
//! Loads the config, builds the API client and resumes a session from the
//! stored credential, so commands start from a ready-to-use session.

use std::path::Path;
use std::sync::Arc;

use log::{debug, error, warn};

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::VehicleClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::{Credential, Session};
use crate::vehicle::Vehicle;

/// Context for command execution containing config, session, and runtime options.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Session resumed from the stored credential
    pub session: Session<VehicleClient>,
    /// Output format (flag > env > config > default)
    pub format: OutputFormat,
    /// Vehicle override from the command line
    vehicle_override: Option<String>,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// A credential renewed while resuming, or later by the background timer,
    /// is written back to the config file.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded, no credential is stored, or
    /// the stored credential can no longer be renewed.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = Config::resolve_path(opts.config_path())?;
        let mut config = Config::load_from(config_path.clone())?;

        if let Some(host) = opts.api_host_ref() {
            config.api_host = Some(host.to_string());
        }

        let client = build_client(&config)?;
        let stored = config.require_credential()?;
        let session =
            Session::resume(Arc::new(client), stored.clone(), config.session_settings()).await?;

        let current = session.credential().await?;
        if current != stored {
            debug!("Credential renewed on resume, saving");
            config.credential = Some(current);
            config.save_to(config_path.clone())?;
        }

        let snapshot = config.clone();
        session.subscribe_to_renewal(
            move |credential| persist_credential(&snapshot, &config_path, credential),
            |err| warn!("Stored credential could not be renewed: {}", err),
        );

        let format = opts
            .format
            .or_else(|| {
                config
                    .preferences
                    .format
                    .as_deref()
                    .and_then(OutputFormat::from_preference)
            })
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            format,
            vehicle_override: opts.vehicle.clone(),
        })
    }

    /// Facade for the selected vehicle (override, then config default).
    pub fn vehicle(&self) -> Result<Vehicle<VehicleClient>> {
        let id = self
            .config
            .require_vehicle_id(self.vehicle_override.as_deref())?;
        Ok(self.session.vehicle(id))
    }

    /// Stop background renewal before the process exits.
    pub fn finish(self) {
        self.session.close();
    }
}

/// Build the HTTP client from config, honoring an API host override.
pub fn build_client(config: &Config) -> Result<VehicleClient> {
    let client = VehicleClient::new(config.client_credentials()?)?;
    Ok(match &config.api_host {
        Some(host) => client.with_base_url(host.as_str()),
        None => client,
    })
}

fn persist_credential(config: &Config, path: &Path, credential: &Credential) {
    let mut updated = config.clone();
    updated.credential = Some(credential.clone());
    match updated.save_to(path.to_path_buf()) {
        Ok(()) => debug!("Saved renewed credential to {}", path.display()),
        Err(e) => error!("Failed to save renewed credential: {}", e),
    }
}
