//! Status command implementation

use chrono::Utc;
use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, CredentialStatus};
use crate::error::Result;
use crate::output::formatters::{format_local_time, format_remaining};

/// Run the status command to display configuration status.
///
/// Reads the config file only; nothing is sent to the API.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "fleetop Configuration Status".bold());

    let config = match Config::load_at(opts.config_path()) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "fleetop init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_path())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    if config.client_credentials().is_ok() {
        println!("{} OAuth client configured", "✓".green());
    } else {
        println!("{} OAuth client not configured", "✗".red());
        println!("  → Run 'fleetop init' to configure");
    }

    if let Some(email) = &config.email {
        println!("{} Account: {}", "✓".green(), email);
    }

    match (config.credential_status(), &config.credential) {
        (CredentialStatus::Valid, Some(credential)) => println!(
            "{} Credential valid (expires in {}, renews at {})",
            "✓".green(),
            format_remaining(credential.expires_at() - Utc::now()),
            format_local_time(credential.renewal_deadline(
                chrono::Duration::from_std(config.refresh_skew())
                    .unwrap_or_else(|_| chrono::Duration::zero())
            ))
        ),
        (CredentialStatus::RenewalDue, Some(credential)) => println!(
            "{} Credential expires in {} (will renew on next command)",
            "⚠".yellow(),
            format_remaining(credential.expires_at() - Utc::now())
        ),
        (CredentialStatus::Expired, _) => {
            println!(
                "{} Credential expired (will try its refresh token on next command)",
                "⚠".yellow()
            );
        }
        _ => {
            println!("{} No stored credential", "✗".red());
            println!("  → Run 'fleetop init' to log in");
        }
    }

    match opts.vehicle_ref().or(config.vehicle_id.as_deref()) {
        Some(id) => println!("{} Default vehicle: {}", "✓".green(), id),
        None => {
            println!("{} No default vehicle set", "○".dimmed());
            println!("  → Pass --vehicle <ID> or rerun 'fleetop init'");
        }
    }

    if let Some(host) = opts.api_host_ref().or(config.api_host.as_deref()) {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }

    println!(
        "{} Cache windows: {}s live data, {}s settings",
        "○".dimmed(),
        config.preferences.fast_window_secs,
        config.preferences.slow_window_secs
    );
    println!();

    Ok(())
}
