use chrono::{DateTime, Local, NaiveDate};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{daily::DailyForecast, period::ConfidenceBand, planner::ChargePlan},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

pub fn build_plan_table(plans: &[(NaiveDate, ChargePlan)]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Excess", "Discharge", "Target", "Rebuild", "Clean backup"]);
    for (date, plan) in plans {
        table.add_row(vec![
            Cell::new(date.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(plan.expected_excess).set_alignment(CellAlignment::Right).fg(
                if plan.expected_excess > KilowattHours::ZERO { Color::Red } else { Color::Green },
            ),
            time_cell(plan.discharge_start),
            match plan.discharge_target {
                Some(target) => Cell::new(target).set_alignment(CellAlignment::Right),
                None => absent_cell(),
            },
            time_cell(plan.reserve_rebuild_start),
            time_cell(plan.clean_backup_start),
        ]);
    }
    table
}

pub fn build_forecast_table(daily: &DailyForecast, ceiling: Kilowatts) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Date", "Start", "End", "P10", "P50", "P90", "Energy", "Excess", "Headroom",
    ]);
    for period in daily.periods() {
        let excess = period.excess(ConfidenceBand::P90, ceiling);
        table.add_row(vec![
            Cell::new(daily.date().format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(period.start().format("%H:%M")),
            Cell::new(period.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(period.power(ConfidenceBand::P10))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(period.power(ConfidenceBand::P50)).set_alignment(CellAlignment::Right),
            Cell::new(period.power(ConfidenceBand::P90)).set_alignment(CellAlignment::Right),
            Cell::new(period.energy()).set_alignment(CellAlignment::Right),
            Cell::new(excess)
                .set_alignment(CellAlignment::Right)
                .fg(if excess > KilowattHours::ZERO { Color::Red } else { Color::Green }),
            Cell::new(period.headroom(ceiling)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn time_cell(instant: Option<DateTime<Local>>) -> Cell {
    instant.map_or_else(absent_cell, |instant| Cell::new(instant.format("%H:%M")))
}

fn absent_cell() -> Cell {
    Cell::new("—").add_attribute(Attribute::Dim)
}
