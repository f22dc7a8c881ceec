mod advisory;
mod cli;
mod commands;
mod config;
mod dedup;
mod ingest;
mod logging;
mod output;
mod report;
mod stats;
mod storage;
mod types;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, OutputFormat};
use ingest::NewFuelLog;
use report::Period;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = config::load_config();
    let owner = config.owner(cli.owner.clone());
    let currency = config.currency_symbol();

    let dir = storage::data_dir(config.data_dir.clone())?;
    let mut store = storage::default_storage(dir)?;

    match cli.effective_command() {
        Command::Add {
            odometer,
            liters,
            price,
            full,
            arla,
            fuel_type,
            station,
        } => {
            let new_log = NewFuelLog {
                odometer_km: odometer,
                liters,
                total_price: price,
                arla_liters: arla,
                is_full_tank: full,
                fuel_type: fuel_type.into(),
                station_name: station,
            };
            let outcome =
                commands::add(store.as_mut(), &owner, new_log, chrono::Utc::now())?;

            match cli.format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "record": outcome.record,
                    "valid_for_average": outcome.anchors_average,
                    "fuel_stats": outcome.report,
                }))?,
                OutputFormat::Table => {
                    eprintln!("Recorded fill-up at {:.0} km.", outcome.record.odometer_km);
                    if outcome.record.is_full_tank && !outcome.anchors_average {
                        eprintln!(
                            "Odometer is not above the previous fill-up; \
                             this full tank will not anchor the average."
                        );
                    }
                    if let Some(report) = &outcome.report {
                        output::print_stats_table(report, currency, config.fuel_efficiency_goal);
                    }
                }
            }
        }
        Command::Stats { month } => {
            let period = match month {
                Some(first) => Period::month(first),
                None => Period::between(cli.from, cli.to),
            };
            let report = commands::stats(store.as_mut(), &owner, &period)?;

            match cli.format {
                OutputFormat::Json => output::print_json(&report)?,
                OutputFormat::Table => {
                    output::print_stats_table(&report, currency, config.fuel_efficiency_goal)
                }
            }
        }
        Command::Log => {
            let period = Period::between(cli.from, cli.to);
            let logs = commands::list(store.as_mut(), &owner, &period)?;
            if logs.is_empty() && cli.format == OutputFormat::Table {
                eprintln!("No fuel logs found.");
                return Ok(());
            }

            match cli.format {
                OutputFormat::Json => output::print_json(&logs)?,
                OutputFormat::Table => output::print_logs_table(&logs, currency),
            }
        }
        Command::Import { file } => {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = commands::import(store.as_mut(), &owner, &data)?;
            eprintln!(
                "Imported {} fuel logs ({} duplicates, {} for other owners, {} rejected).",
                summary.imported, summary.duplicates, summary.foreign, summary.rejected
            );
        }
    }

    Ok(())
}
