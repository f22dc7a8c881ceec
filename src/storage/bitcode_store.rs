use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{sort_chronologically, Storage};
use crate::types::FuelLogRecord;

/// One file per owner: `{data_dir}/{owner}.bin`
///
/// Each owner's logs are loaded lazily, so a run only pays for the
/// driver it reports on.
pub struct BitcodeStorage {
    dir: PathBuf,
    owners: HashMap<String, OwnerLogs>,
}

#[derive(Serialize, Deserialize, Default)]
struct OwnerLogs {
    records: Vec<FuelLogRecord>,
    #[serde(skip)]
    dirty: bool,
}

/// Owner ids are opaque; hex keeps them distinct and inside the data directory.
fn file_name(owner_id: &str) -> String {
    format!("{}.bin", hex::encode(owner_id.as_bytes()))
}

impl BitcodeStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            owners: HashMap::new(),
        }
    }

    /// Load (or create) the logs for a specific owner, lazily.
    fn owner_logs(&mut self, owner_id: &str) -> Result<&mut OwnerLogs> {
        if !self.owners.contains_key(owner_id) {
            let path = self.dir.join(file_name(owner_id));
            let mut logs = match fs::read(&path) {
                Ok(data) => bitcode::deserialize::<OwnerLogs>(&data)
                    .with_context(|| format!("corrupt fuel log file {}", path.display()))?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => OwnerLogs::default(),
                Err(e) => {
                    return Err(e).with_context(|| format!("failed to read {}", path.display()))
                }
            };
            let before = logs.records.len();
            logs.records.retain(|r| r.owner_id == owner_id);
            if logs.records.len() != before {
                tracing::warn!(
                    owner_id,
                    dropped = before - logs.records.len(),
                    "ignoring records of other owners in fuel log file"
                );
            }
            tracing::debug!(owner_id, records = logs.records.len(), "loaded fuel logs");
            self.owners.insert(owner_id.to_string(), logs);
        }
        self.owners
            .get_mut(owner_id)
            .context("owner logs missing after load")
    }
}

impl Storage for BitcodeStorage {
    fn insert(&mut self, record: FuelLogRecord) -> Result<()> {
        let logs = self.owner_logs(&record.owner_id)?;
        logs.records.push(record);
        logs.dirty = true;
        Ok(())
    }

    fn logs_for_owner(&mut self, owner_id: &str) -> Result<Vec<FuelLogRecord>> {
        let mut records = self.owner_logs(owner_id)?.records.clone();
        sort_chronologically(&mut records);
        Ok(records)
    }

    fn flush(&self) -> Result<()> {
        if !self.owners.values().any(|logs| logs.dirty) {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        for (owner_id, logs) in &self.owners {
            if !logs.dirty {
                continue;
            }
            let data = bitcode::serialize(logs)
                .with_context(|| format!("failed to serialize logs for {owner_id}"))?;
            let path = self.dir.join(file_name(owner_id));
            fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(owner_id, path = %path.display(), "flushed fuel logs");
        }
        Ok(())
    }
}
