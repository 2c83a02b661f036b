//! Init command implementation

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::cli::context::build_client;
use crate::config::Config;
use crate::error::Result;
use crate::models::VehicleDisplay;
use crate::session::Session;

/// Run the init command
///
/// Prompts for the OAuth application and account credentials, logs in, and
/// stores the resulting credential with a default vehicle. The password is
/// never written to disk.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to fleetop!".bold().green());
    println!("Let's connect to your vehicle account.\n");

    let theme = ColorfulTheme::default();
    let mut config = Config::load_at(opts.config_path()).unwrap_or_default();
    if let Some(host) = opts.api_host_ref() {
        config.api_host = Some(host.to_string());
    }

    let client_id: String = Input::with_theme(&theme)
        .with_prompt("OAuth client id")
        .with_initial_text(config.client_id.clone().unwrap_or_default())
        .interact_text()?;
    let client_secret: String = Password::with_theme(&theme)
        .with_prompt("OAuth client secret")
        .interact()?;
    let email: String = Input::with_theme(&theme)
        .with_prompt("Account email")
        .with_initial_text(config.email.clone().unwrap_or_default())
        .interact_text()?;
    let password: String = Password::with_theme(&theme)
        .with_prompt("Account password")
        .interact()?;

    config.client_id = Some(client_id);
    config.client_secret = Some(client_secret);
    config.email = Some(email.clone());

    println!("\n{}", "Authenticating...".cyan());
    let client = Arc::new(build_client(&config)?);
    let session = Session::login(client, &email, &password, config.session_settings()).await?;
    println!("{}", "✓ Authentication successful!".green());

    println!("\n{}", "Fetching your vehicles...".cyan());
    let vehicles: Vec<VehicleDisplay> = session
        .vehicles()
        .await?
        .iter()
        .filter_map(|v| v.summary().map(VehicleDisplay::from))
        .collect();

    config.vehicle_id = if vehicles.is_empty() {
        println!("{}", "⚠ No vehicles found on this account.".yellow());
        None
    } else if vehicles.len() == 1 {
        let only = &vehicles[0];
        println!("Found vehicle: {}", only.name.bold());
        let use_it = Confirm::with_theme(&theme)
            .with_prompt("Set this as your default vehicle?")
            .default(true)
            .interact()?;

        if use_it { Some(only.id.clone()) } else { None }
    } else {
        let names: Vec<String> = vehicles
            .iter()
            .map(|v| format!("{} ({})", v.name, v.vin))
            .collect();

        println!("Found {} vehicles.", vehicles.len());
        let selection = Select::with_theme(&theme)
            .with_prompt("Select your default vehicle")
            .items(&names)
            .default(0)
            .interact_opt()?;

        selection.map(|idx| vehicles[idx].id.clone())
    };

    config.credential = Some(session.credential().await?);
    session.close();
    config.save_at(opts.config_path())?;

    let config_path = Config::resolve_path(opts.config_path())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    if let Some(id) = &config.vehicle_id {
        println!("  Default vehicle: {}", id.bold());
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show credential status", "fleetop status".cyan());
    println!("  {} - Show battery and charging", "fleetop vehicle get charge".cyan());

    Ok(())
}
