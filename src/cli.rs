use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::types::FuelType;

#[derive(Parser, Debug)]
#[command(
    name = "copiloto",
    about = "Fuel fill-up log and consumption average for truck drivers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Whose logs to use (defaults to `owner` in config.toml)
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Start date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub from: Option<NaiveDate>,

    /// End date filter (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub to: Option<NaiveDate>,

    /// Output format: table (default), json
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Record a fill-up
    Add {
        /// Odometer reading in km
        #[arg(long)]
        odometer: f64,
        /// Fuel volume in liters (without Arla)
        #[arg(long)]
        liters: f64,
        /// Amount paid
        #[arg(long)]
        price: f64,
        /// The tank was filled to capacity
        #[arg(long)]
        full: bool,
        /// Arla 32 volume in liters
        #[arg(long, default_value = "0")]
        arla: f64,
        #[arg(long, value_enum, default_value = "diesel")]
        fuel_type: FuelTypeArg,
        #[arg(long)]
        station: Option<String>,
    },
    /// Show fuel statistics (default)
    Stats {
        /// Only logs created in this month (YYYY-MM)
        #[arg(long, value_parser = parse_month, conflicts_with_all = ["from", "to"])]
        month: Option<NaiveDate>,
    },
    /// List recorded fill-ups
    Log,
    /// Import fuel logs from a JSON export
    Import {
        file: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum FuelTypeArg {
    Diesel,
    Arla32,
}

impl From<FuelTypeArg> for FuelType {
    fn from(arg: FuelTypeArg) -> Self {
        match arg {
            FuelTypeArg::Diesel => FuelType::Diesel,
            FuelTypeArg::Arla32 => FuelType::Arla32,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// "2026-03" → first day of that month.
fn parse_month(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got {raw:?}"))
}

impl Cli {
    pub fn effective_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Stats { month: None })
    }
}
