//! Vehicle command implementations

use std::time::Duration;

use chrono::Utc;
use colored::Colorize;
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, DataGroup, OutputFormat};
use crate::client::VehicleDataApi;
use crate::error::Result;
use crate::models::{GroupSnapshot, VehicleDisplay};
use crate::output::{self, formatters::format_local_time};
use crate::vehicle::Vehicle;

/// List vehicles on the account
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    let vehicles = ctx.session.vehicles().await?;
    let display: Vec<VehicleDisplay> = vehicles
        .iter()
        .filter_map(|v| v.summary().map(VehicleDisplay::from))
        .collect();

    output::print(display.as_slice(), ctx.format)?;
    ctx.finish();
    Ok(())
}

/// Read one data group from the selected vehicle
pub async fn get(group: DataGroup, opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let vehicle = ctx.vehicle()?;

    let snapshot = read_group(&vehicle, group).await?;
    output::print(&snapshot, ctx.format)?;

    ctx.finish();
    Ok(())
}

/// Read a data group repeatedly.
///
/// Reads inside the group's freshness window are answered from cache, so a
/// short interval does not multiply API calls.
pub async fn watch(
    group: DataGroup,
    interval: u64,
    count: Option<u64>,
    opts: &GlobalOptions,
) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let vehicle = ctx.vehicle()?;
    let interval = Duration::from_secs(interval.max(1));

    let mut reads = 0u64;
    loop {
        let snapshot = read_group(&vehicle, group).await?;
        reads += 1;

        if ctx.format == OutputFormat::Pretty {
            println!("{}", format_local_time(Utc::now()).dimmed());
        }
        output::print(&snapshot, ctx.format)?;

        if count.is_some_and(|limit| reads >= limit) {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted after {} reads", reads);
                break;
            }
        }
    }

    ctx.finish();
    Ok(())
}

/// Read `group` through the facade's cache
pub async fn read_group<C: VehicleDataApi>(
    vehicle: &Vehicle<C>,
    group: DataGroup,
) -> Result<GroupSnapshot> {
    let label = group.label();
    let id = vehicle.id();
    let snapshot = match group {
        DataGroup::Drive => GroupSnapshot::new(id, label, &vehicle.drive_state().await?)?,
        DataGroup::Charge => GroupSnapshot::new(id, label, &vehicle.charge_state().await?)?,
        DataGroup::Climate => GroupSnapshot::new(id, label, &vehicle.climate_state().await?)?,
        DataGroup::State => GroupSnapshot::new(id, label, &vehicle.vehicle_state().await?)?,
        DataGroup::Gui => GroupSnapshot::new(id, label, &vehicle.gui_settings().await?)?,
        DataGroup::Config => GroupSnapshot::new(id, label, &vehicle.vehicle_config().await?)?,
        DataGroup::All => GroupSnapshot::new(id, label, &vehicle.vehicle_data().await?)?,
    };
    Ok(snapshot)
}
