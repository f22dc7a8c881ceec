use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::advisory::is_valid_for_average;
use crate::dedup::dedup;
use crate::ingest::{parse_raw_logs, NewFuelLog};
use crate::report::{build_report, Period};
use crate::storage::Storage;
use crate::types::{FuelLogRecord, FuelStatsReport};

#[derive(Debug)]
pub struct AddOutcome {
    pub record: FuelLogRecord,
    /// Whether the record can anchor the consumption average.
    pub anchors_average: bool,
    /// Refreshed all-time stats, only after a full tank.
    pub report: Option<FuelStatsReport>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
    pub foreign: usize,
    pub rejected: usize,
}

fn log_report(report: &FuelStatsReport) {
    if let Some(avg) = report.stats.average_consumption_km_per_liter {
        tracing::info!(km_per_liter = avg, "fuel average calculated");
    }
    if report.suggest_full_tank {
        tracing::info!("suggesting a full tank for an accurate average");
    }
}

pub fn add(
    storage: &mut dyn Storage,
    owner_id: &str,
    new_log: NewFuelLog,
    now: DateTime<Utc>,
) -> Result<AddOutcome> {
    let record = new_log
        .into_record(owner_id, Uuid::new_v4().to_string(), now)
        .context("invalid fill-up")?;

    let prior = storage.logs_for_owner(owner_id)?;
    let anchors_average = is_valid_for_average(&record, &prior);
    if record.is_full_tank && !anchors_average {
        tracing::warn!(
            odometer = record.odometer_km,
            previous = prior.last().map(|r| r.odometer_km),
            "full tank does not advance the odometer; it will not anchor the average"
        );
    }

    storage.insert(record.clone())?;
    storage.flush()?;

    let report = if record.is_full_tank {
        let logs = storage.logs_for_owner(owner_id)?;
        let report = build_report(&logs, &Period::all());
        log_report(&report);
        Some(report)
    } else {
        None
    };

    Ok(AddOutcome {
        record,
        anchors_average,
        report,
    })
}

pub fn stats(storage: &mut dyn Storage, owner_id: &str, period: &Period) -> Result<FuelStatsReport> {
    let logs = storage.logs_for_owner(owner_id)?;
    let report = build_report(&logs, period);
    log_report(&report);
    Ok(report)
}

pub fn list(
    storage: &mut dyn Storage,
    owner_id: &str,
    period: &Period,
) -> Result<Vec<FuelLogRecord>> {
    Ok(storage
        .logs_for_owner(owner_id)?
        .into_iter()
        .filter(|r| period.contains(r))
        .collect())
}

/// Import rows from a JSON export. Rows that fail coercion are skipped
/// with a warning rather than aborting the whole import.
pub fn import(storage: &mut dyn Storage, owner_id: &str, json: &str) -> Result<ImportSummary> {
    let rows = parse_raw_logs(json).context("export is not a JSON array of fuel logs")?;
    let mut summary = ImportSummary::default();

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match row.into_record(owner_id) {
            Ok(record) if record.owner_id != owner_id => summary.foreign += 1,
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(row = index, error = %e, "skipping fuel log");
                summary.rejected += 1;
            }
        }
    }

    let existing = storage.logs_for_owner(owner_id)?;
    let candidates = records.len();
    let fresh = dedup(records, &existing);
    summary.duplicates = candidates - fresh.len();
    summary.imported = fresh.len();

    for record in fresh {
        storage.insert(record)?;
    }
    storage.flush()?;

    tracing::debug!(?summary, "import finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::storage::sort_chronologically;
    use crate::types::FuelType;

    #[derive(Default)]
    struct MemoryStorage {
        owners: HashMap<String, Vec<FuelLogRecord>>,
    }

    impl Storage for MemoryStorage {
        fn insert(&mut self, record: FuelLogRecord) -> Result<()> {
            self.owners
                .entry(record.owner_id.clone())
                .or_default()
                .push(record);
            Ok(())
        }

        fn logs_for_owner(&mut self, owner_id: &str) -> Result<Vec<FuelLogRecord>> {
            let mut logs = self.owners.get(owner_id).cloned().unwrap_or_default();
            sort_chronologically(&mut logs);
            Ok(logs)
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }
    }

    fn fill(odometer_km: f64, liters: f64, is_full_tank: bool) -> NewFuelLog {
        NewFuelLog {
            odometer_km,
            liters,
            total_price: liters * 6.0,
            arla_liters: 0.0,
            is_full_tank,
            fuel_type: FuelType::Diesel,
            station_name: None,
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, minute, 0).unwrap()
    }

    #[test]
    fn add_full_tanks_reports_average() {
        let mut store = MemoryStorage::default();

        let first = add(&mut store, "joao", fill(100_000.0, 50.0, true), at(0)).unwrap();
        assert!(first.anchors_average);
        let report = first.report.unwrap();
        assert_eq!(report.stats.average_consumption_km_per_liter, None);

        let second = add(&mut store, "joao", fill(100_500.0, 40.0, true), at(1)).unwrap();
        assert!(second.anchors_average);
        let report = second.report.unwrap();
        assert_eq!(report.stats.average_consumption_km_per_liter, Some(12.5));
        assert_eq!(report.period, "all");
    }

    #[test]
    fn add_partial_skips_report() {
        let mut store = MemoryStorage::default();
        let outcome = add(&mut store, "joao", fill(100_000.0, 20.0, false), at(0)).unwrap();
        assert!(!outcome.anchors_average);
        assert!(outcome.report.is_none());
        assert_eq!(store.logs_for_owner("joao").unwrap().len(), 1);
    }

    #[test]
    fn add_flags_backfilled_odometer_but_still_stores() {
        let mut store = MemoryStorage::default();
        add(&mut store, "joao", fill(100_000.0, 50.0, true), at(0)).unwrap();

        let backfill = add(&mut store, "joao", fill(99_000.0, 40.0, true), at(1)).unwrap();
        assert!(!backfill.anchors_average);
        assert_eq!(store.logs_for_owner("joao").unwrap().len(), 2);

        let forward = add(&mut store, "joao", fill(100_600.0, 40.0, true), at(2)).unwrap();
        assert!(forward.anchors_average);
    }

    #[test]
    fn add_rejects_invalid_fill() {
        let mut store = MemoryStorage::default();
        assert!(add(&mut store, "joao", fill(100_000.0, 0.0, true), at(0)).is_err());
        assert!(store.logs_for_owner("joao").unwrap().is_empty());
    }

    #[test]
    fn stats_are_scoped_per_owner() {
        let mut store = MemoryStorage::default();
        add(&mut store, "joao", fill(100_000.0, 50.0, true), at(0)).unwrap();
        add(&mut store, "joao", fill(100_500.0, 40.0, true), at(1)).unwrap();
        add(&mut store, "maria", fill(5_000.0, 60.0, true), at(2)).unwrap();

        let joao = stats(&mut store, "joao", &Period::all()).unwrap();
        assert_eq!(joao.logs_count, 2);
        assert_eq!(joao.stats.total_liters, 90.0);

        let maria = stats(&mut store, "maria", &Period::all()).unwrap();
        assert_eq!(maria.logs_count, 1);
        assert_eq!(maria.stats.average_consumption_km_per_liter, None);
    }

    #[test]
    fn import_coerces_dedups_and_skips_bad_rows() {
        let mut store = MemoryStorage::default();
        let export = r#"[
            {"id": "a", "odometer": "100000", "liters": "50", "total_price": "300", "is_full_tank": true, "created_at": "2026-03-01T08:00:00Z"},
            {"id": "b", "odometer": 100500, "liters": 40, "arla_liters": 20, "is_full_tank": "true", "created_at": "2026-03-02 08:00:00"},
            {"id": "a", "odometer": 100000, "liters": 50, "created_at": "2026-03-01T08:00:00Z"},
            {"id": "c", "odometer": "n/a", "liters": 10, "created_at": "2026-03-03T08:00:00Z"},
            {"id": "d", "user_id": "maria", "odometer": 1, "liters": 1, "created_at": "2026-03-03T08:00:00Z"}
        ]"#;

        let summary = import(&mut store, "joao", export).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                duplicates: 1,
                foreign: 1,
                rejected: 1,
            }
        );

        let report = stats(&mut store, "joao", &Period::all()).unwrap();
        assert_eq!(report.stats.average_consumption_km_per_liter, Some(12.5));
        assert_eq!(report.stats.total_liters, 90.0);

        // Re-importing the same export adds nothing.
        let again = import(&mut store, "joao", export).unwrap();
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 3);
    }

    #[test]
    fn import_rejects_non_array() {
        let mut store = MemoryStorage::default();
        assert!(import(&mut store, "joao", r#"{"id": "a"}"#).is_err());
    }

    #[test]
    fn list_filters_by_period() {
        let mut store = MemoryStorage::default();
        add(&mut store, "joao", fill(100_000.0, 50.0, true), at(0)).unwrap();
        let march = Period::month(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(list(&mut store, "joao", &march).unwrap().len(), 1);
        let april = Period::month(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
        assert!(list(&mut store, "joao", &april).unwrap().is_empty());
    }
}
