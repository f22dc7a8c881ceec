use std::cmp::Ordering;

use crate::types::{FuelLogRecord, FuelStatsSnapshot};

/// Full-tank records in ascending odometer order.
///
/// The average is taken from the first and last entries as supplied, so
/// the ordering is a precondition, not something checked here. Only
/// [`calculate_fuel_stats`] builds one, after sorting.
struct FullTankWindow<'a> {
    logs: Vec<&'a FuelLogRecord>,
}

impl<'a> FullTankWindow<'a> {
    fn from_sorted(logs: Vec<&'a FuelLogRecord>) -> Self {
        Self { logs }
    }

    /// Distance over fuel burnt between the first and last full tank.
    ///
    /// The first entry is a calibration point: its liters refilled an
    /// unknown deficit, so only fill-ups after it count as consumed fuel.
    fn average_consumption(&self) -> Option<f64> {
        let [first, rest @ ..] = self.logs.as_slice() else {
            return None;
        };
        let last = rest.last()?;

        let distance = last.odometer_km - first.odometer_km;
        let consumed: f64 = rest.iter().map(|log| log.liters).sum();

        if distance > 0.0 && consumed > 0.0 {
            Some(distance / consumed)
        } else {
            None
        }
    }
}

fn by_odometer_then_time(a: &&FuelLogRecord, b: &&FuelLogRecord) -> Ordering {
    a.odometer_km
        .total_cmp(&b.odometer_km)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Fold one owner's logs, in any order, into a stats snapshot.
///
/// Averages only use full tanks (the full-tank rule); totals use every log.
/// Arla volume is left out of both.
pub fn calculate_fuel_stats(logs: &[FuelLogRecord]) -> FuelStatsSnapshot {
    if logs.is_empty() {
        return FuelStatsSnapshot::empty();
    }

    let mut sorted: Vec<&FuelLogRecord> = logs.iter().collect();
    sorted.sort_by(by_odometer_then_time);

    let (full_tanks, partials): (Vec<&FuelLogRecord>, Vec<&FuelLogRecord>) =
        sorted.iter().copied().partition(|log| log.is_full_tank);

    let total_liters: f64 = sorted.iter().map(|log| log.liters).sum();
    let total_spent: f64 = sorted.iter().map(|log| log.total_price).sum();
    let average_price_per_liter = (total_liters > 0.0).then(|| total_spent / total_liters);

    let last_full_tank = full_tanks.last().copied();
    let full_tank_count = full_tanks.len();
    let window = FullTankWindow::from_sorted(full_tanks);

    FuelStatsSnapshot {
        average_consumption_km_per_liter: window.average_consumption(),
        total_liters,
        total_spent,
        last_full_tank_odometer_km: last_full_tank.map(|log| log.odometer_km),
        last_full_tank_timestamp: last_full_tank.map(|log| log.created_at),
        partial_fill_count: partials.len(),
        full_tank_count,
        average_price_per_liter,
    }
}
