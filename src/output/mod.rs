//! Output formatting for CLI results

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::models::{GroupSnapshot, VehicleDisplay};

pub mod formatters;
pub mod json;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;
}

/// Format and print data to stdout
pub fn print<T: Formattable + ?Sized>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}

impl Formattable for [VehicleDisplay] {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::vehicles(self)?),
            OutputFormat::Table => Ok(table::vehicles(self)),
            OutputFormat::Pretty => {
                if self.is_empty() {
                    return Ok("No vehicles on this account.".to_string());
                }
                let lines: Vec<String> = self
                    .iter()
                    .map(|v| {
                        format!(
                            "{} {} ({}) {}",
                            state_marker(&v.state),
                            v.name.bold(),
                            v.id.cyan(),
                            v.vin.dimmed()
                        )
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }
}

impl Formattable for GroupSnapshot {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::snapshot(self)?),
            OutputFormat::Table => Ok(table::snapshot(self)),
            OutputFormat::Pretty => {
                let mut out = format!("{} {}", self.group.bold(), self.vehicle_id.dimmed());
                for field in self.fields() {
                    out.push_str(&format!("\n  {}: {}", field.field, field.value));
                }
                Ok(out)
            }
        }
    }
}

fn state_marker(state: &str) -> colored::ColoredString {
    match state {
        "online" => "●".green(),
        "asleep" => "●".blue(),
        _ => "○".dimmed(),
    }
}
