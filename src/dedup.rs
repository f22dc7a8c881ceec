use std::collections::HashSet;

use crate::types::FuelLogRecord;

/// Drop records whose id was already seen, either earlier in `records`
/// or in `existing`. First occurrence wins.
pub fn dedup(records: Vec<FuelLogRecord>, existing: &[FuelLogRecord]) -> Vec<FuelLogRecord> {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.id.clone()).collect();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}
