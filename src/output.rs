use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::types::{FuelLogRecord, FuelStatsReport};

/// Shown wherever a value is undetermined.
pub const UNDETERMINED: &str = "—";

fn format_number(value: f64) -> String {
    format!("{value:.2}")
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => UNDETERMINED.to_string(),
    }
}

fn format_money(value: f64, currency: &str) -> String {
    format!("{currency} {value:.2}")
}

fn format_odometer(km: f64) -> String {
    format!("{km:.0} km")
}

/// How the measured average compares to the configured goal.
fn goal_status(average: Option<f64>, goal: f64) -> String {
    match average {
        Some(avg) if avg >= goal => format!("{goal:.2} km/l (met)"),
        Some(avg) => format!("{goal:.2} km/l ({:.2} below)", goal - avg),
        None => format!("{goal:.2} km/l"),
    }
}

pub fn print_stats_table(report: &FuelStatsReport, currency: &str, goal: Option<f64>) {
    let stats = &report.stats;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new(format!("Period {}", report.period)), Cell::new("")]);

    let mut rows = vec![
        (
            "Average",
            format_optional(stats.average_consumption_km_per_liter, " km/l"),
        ),
        ("Total liters", format!("{} L", format_number(stats.total_liters))),
        ("Total spent", format_money(stats.total_spent, currency)),
        (
            "Price per liter",
            stats
                .average_price_per_liter
                .map(|p| format_money(p, currency))
                .unwrap_or_else(|| UNDETERMINED.to_string()),
        ),
        (
            "Last full tank",
            match (stats.last_full_tank_odometer_km, stats.last_full_tank_timestamp) {
                (Some(km), Some(at)) => {
                    format!("{} on {}", format_odometer(km), at.format("%Y-%m-%d"))
                }
                _ => UNDETERMINED.to_string(),
            },
        ),
        ("Full tanks", stats.full_tank_count.to_string()),
        ("Partial fills", stats.partial_fill_count.to_string()),
        ("Fill-ups", report.logs_count.to_string()),
    ];
    if let Some(goal) = goal {
        rows.insert(1, ("Goal", goal_status(stats.average_consumption_km_per_liter, goal)));
    }

    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }

    println!("{table}");

    if report.suggest_full_tank {
        println!("Tip: fill the tank completely next time to keep the average accurate.");
    }
}

pub fn print_logs_table(logs: &[FuelLogRecord], currency: &str) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Date", "Odometer", "Liters", "Arla", "Price", "Full", "Fuel", "Station",
    ]);

    for log in logs {
        table.add_row(vec![
            Cell::new(log.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(format_odometer(log.odometer_km)),
            Cell::new(format_number(log.liters)),
            Cell::new(format_number(log.arla_liters)),
            Cell::new(format_money(log.total_price, currency)),
            Cell::new(if log.is_full_tank { "yes" } else { "no" }),
            Cell::new(log.fuel_type.label()),
            Cell::new(log.station_name.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}
