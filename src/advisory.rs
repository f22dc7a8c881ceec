use crate::types::FuelLogRecord;

/// How many trailing logs the suggestion looks at.
pub const SUGGESTION_WINDOW: usize = 5;
/// Partial fills within the window that trigger a full-tank suggestion.
pub const SUGGESTION_PARTIAL_THRESHOLD: usize = 3;

/// Whether the driver should fill the tank completely next time.
///
/// Looks at the last [`SUGGESTION_WINDOW`] logs in the order given (callers
/// pass chronological order) and fires when at least
/// [`SUGGESTION_PARTIAL_THRESHOLD`] of them were partial fills. Shorter
/// histories are checked against the same absolute threshold.
pub fn should_suggest_full_tank(logs: &[FuelLogRecord]) -> bool {
    let start = logs.len().saturating_sub(SUGGESTION_WINDOW);
    let partials = logs[start..]
        .iter()
        .filter(|log| !log.is_full_tank)
        .count();
    partials >= SUGGESTION_PARTIAL_THRESHOLD
}

/// Whether `candidate` can anchor the consumption average.
///
/// `prior` is the owner's earlier logs in chronological order. Only full
/// tanks qualify, and only when the odometer moved past the most recent
/// prior reading. This is advice for the caller; nothing is dropped.
pub fn is_valid_for_average(candidate: &FuelLogRecord, prior: &[FuelLogRecord]) -> bool {
    if !candidate.is_full_tank {
        return false;
    }
    match prior.last() {
        None => true,
        Some(last) => candidate.odometer_km > last.odometer_km,
    }
}
