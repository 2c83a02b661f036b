//! Table output

use tabled::{
    Table, Tabled,
    settings::{
        Alignment, Modify, Panel, Style,
        object::{Columns, Rows},
    },
};

use crate::models::{GroupSnapshot, VehicleDisplay};

/// Vehicle list, one row per vehicle
pub fn vehicles(rows: &[VehicleDisplay]) -> String {
    if rows.is_empty() {
        return "No vehicles on this account.".to_string();
    }
    rounded(Table::new(rows)).to_string()
}

/// One row per reported field, titled with the group and vehicle
pub fn snapshot(snapshot: &GroupSnapshot) -> String {
    let fields = snapshot.fields();
    if fields.is_empty() {
        return format!(
            "No {} reported for vehicle {}.",
            snapshot.group, snapshot.vehicle_id
        );
    }

    let mut table = Table::new(&fields);
    table
        .with(Modify::new(Columns::last()).with(Alignment::right()))
        .with(Panel::header(format!(
            "{} ({})",
            snapshot.group, snapshot.vehicle_id
        )));
    rounded(table).to_string()
}

fn rounded(mut table: Table) -> Table {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table
}
