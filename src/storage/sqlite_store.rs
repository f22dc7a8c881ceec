use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use super::Storage;
use crate::types::{FuelLogRecord, FuelType};

const SCHEMA_VERSION: i64 = 1;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("fuel_logs.db");
        let conn = Connection::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
            .context("failed to set sqlite pragmas")?;

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);
        if version > SCHEMA_VERSION {
            anyhow::bail!("fuel log database schema v{version} is newer than this build");
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS fuel_logs (
                 id            TEXT PRIMARY KEY,
                 owner_id      TEXT NOT NULL,
                 odometer_km   REAL NOT NULL,
                 liters        REAL NOT NULL,
                 arla_liters   REAL NOT NULL,
                 total_price   REAL NOT NULL,
                 is_full_tank  INTEGER NOT NULL,
                 fuel_type     TEXT NOT NULL,
                 station_name  TEXT,
                 created_at    TEXT NOT NULL
             );

             CREATE INDEX IF NOT EXISTS idx_fuel_logs_owner
                 ON fuel_logs(owner_id, created_at);

             PRAGMA user_version = {SCHEMA_VERSION};"
        ))
        .context("failed to initialize sqlite schema")?;

        Ok(Self { conn })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FuelLogRecord> {
    let created: String = row.get(9)?;
    let created_at = created.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let fuel_type = match row.get::<_, String>(7)?.as_str() {
        "arla32" => FuelType::Arla32,
        _ => FuelType::Diesel,
    };
    Ok(FuelLogRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        odometer_km: row.get(2)?,
        liters: row.get(3)?,
        arla_liters: row.get(4)?,
        total_price: row.get(5)?,
        is_full_tank: row.get(6)?,
        fuel_type,
        station_name: row.get(8)?,
        created_at,
    })
}

impl Storage for SqliteStorage {
    fn insert(&mut self, record: FuelLogRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO fuel_logs (
                    id, owner_id, odometer_km, liters, arla_liters,
                    total_price, is_full_tank, fuel_type, station_name, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id,
                    record.owner_id,
                    record.odometer_km,
                    record.liters,
                    record.arla_liters,
                    record.total_price,
                    record.is_full_tank,
                    record.fuel_type.label(),
                    record.station_name,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert fuel log {}", record.id))?;
        Ok(())
    }

    fn logs_for_owner(&mut self, owner_id: &str) -> Result<Vec<FuelLogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, odometer_km, liters, arla_liters, total_price,
                    is_full_tank, fuel_type, station_name, created_at
               FROM fuel_logs
              WHERE owner_id = ?1
              ORDER BY created_at ASC, id ASC",
        )?;
        let records = stmt
            .query_map(params![owner_id], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("failed to read fuel logs for {owner_id}"))?;
        Ok(records)
    }

    fn flush(&self) -> Result<()> {
        // WAL mode — writes are already persisted
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::log;

    #[test]
    fn round_trips_records() {
        let mut store = SqliteStorage::open_in_memory().unwrap();
        let mut arla = log(1, 100_500.0, 40.0, true);
        arla.arla_liters = 20.0;
        arla.fuel_type = FuelType::Arla32;
        arla.station_name = Some("Posto Graal".to_string());

        store.insert(arla.clone()).unwrap();
        store.insert(log(0, 100_000.0, 50.0, true)).unwrap();

        let logs = store.logs_for_owner("driver-1").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, "log-0");
        assert_eq!(logs[1], arla);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut store = SqliteStorage::open_in_memory().unwrap();
        store.insert(log(0, 100_000.0, 50.0, true)).unwrap();
        assert!(store.insert(log(0, 100_000.0, 50.0, true)).is_err());
    }
}
