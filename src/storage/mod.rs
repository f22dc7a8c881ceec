#[cfg(not(feature = "sqlite"))]
pub mod bitcode_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::types::FuelLogRecord;

/// Where fuel logs live between runs.
///
/// Every read is scoped to one owner; statistics never mix drivers.
pub trait Storage {
    /// Store a new record under its `owner_id`.
    fn insert(&mut self, record: FuelLogRecord) -> Result<()>;

    /// All of an owner's logs, oldest `created_at` first.
    fn logs_for_owner(&mut self, owner_id: &str) -> Result<Vec<FuelLogRecord>>;

    /// Persist any pending changes. No-op if nothing changed.
    fn flush(&self) -> Result<()>;
}

/// `~/.local/share/copiloto` unless the config points elsewhere.
pub fn data_dir(configured: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir);
    }
    ProjectDirs::from("", "", "copiloto")
        .map(|d| d.data_dir().to_path_buf())
        .context("could not determine a data directory; set `data_dir` in config.toml")
}

pub fn default_storage(dir: PathBuf) -> Result<Box<dyn Storage>> {
    #[cfg(feature = "sqlite")]
    {
        Ok(Box::new(sqlite_store::SqliteStorage::open(&dir)?))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        Ok(Box::new(bitcode_store::BitcodeStorage::new(dir)))
    }
}

pub(crate) fn sort_chronologically(logs: &mut [FuelLogRecord]) {
    logs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
