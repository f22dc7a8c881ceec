use chrono::{Months, NaiveDate};

use crate::advisory::should_suggest_full_tank;
use crate::stats::calculate_fuel_stats;
use crate::types::{FuelLogRecord, FuelStatsReport};

/// Inclusive `created_at` date window a report covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub label: String,
}

impl Period {
    pub fn all() -> Self {
        Self {
            range: None,
            label: "all".to_string(),
        }
    }

    /// The calendar month starting at `first`.
    pub fn month(first: NaiveDate) -> Self {
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);
        Self {
            range: Some((first, last)),
            label: first.format("%Y-%m").to_string(),
        }
    }

    /// Open-ended bounds fill in the same way as the `--from/--to` flags.
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let range = match (from, to) {
            (Some(f), Some(t)) => (f, t),
            (Some(f), None) => (f, NaiveDate::MAX),
            (None, Some(t)) => (NaiveDate::MIN, t),
            (None, None) => return Self::all(),
        };
        let label = match (from, to) {
            (Some(f), Some(t)) if f == t => format!("{f}"),
            (Some(f), Some(t)) => format!("{f}..{t}"),
            (Some(f), None) => format!("{f}.."),
            _ => format!("..{}", range.1),
        };
        Self {
            range: Some(range),
            label,
        }
    }

    pub fn contains(&self, record: &FuelLogRecord) -> bool {
        match self.range {
            Some((from, to)) => {
                let date = record.created_at.date_naive();
                date >= from && date <= to
            }
            None => true,
        }
    }
}

/// Stats plus the full-tank suggestion for the logs inside `period`.
///
/// `logs` must be in chronological order; the suggestion reads its tail.
pub fn build_report(logs: &[FuelLogRecord], period: &Period) -> FuelStatsReport {
    let selected: Vec<FuelLogRecord> = logs
        .iter()
        .filter(|r| period.contains(r))
        .cloned()
        .collect();

    FuelStatsReport {
        stats: calculate_fuel_stats(&selected),
        logs_count: selected.len(),
        suggest_full_tank: should_suggest_full_tank(&selected),
        period: period.label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::fixtures::log;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_covers_whole_calendar_month() {
        let feb = Period::month(date(2028, 2, 1));
        assert_eq!(feb.range, Some((date(2028, 2, 1), date(2028, 2, 29))));
        assert_eq!(feb.label, "2028-02");

        let dec = Period::month(date(2026, 12, 1));
        assert_eq!(dec.range, Some((date(2026, 12, 1), date(2026, 12, 31))));
    }

    #[test]
    fn between_labels_bounds() {
        assert_eq!(Period::between(None, None), Period::all());
        assert_eq!(
            Period::between(Some(date(2026, 3, 1)), Some(date(2026, 3, 1))).label,
            "2026-03-01"
        );
        assert_eq!(
            Period::between(Some(date(2026, 3, 1)), None).label,
            "2026-03-01.."
        );
        assert_eq!(
            Period::between(None, Some(date(2026, 3, 9))).label,
            "..2026-03-09"
        );
    }

    #[test]
    fn report_only_uses_logs_inside_period() {
        let mut april = log(3, 101_500.0, 45.0, true);
        april.created_at += Duration::days(40);
        let logs = vec![
            log(0, 100_000.0, 50.0, true),
            log(1, 100_500.0, 40.0, true),
            april,
        ];

        let march = build_report(&logs, &Period::month(date(2026, 3, 1)));
        assert_eq!(march.logs_count, 2);
        assert_eq!(march.stats.average_consumption_km_per_liter, Some(12.5));
        assert_eq!(march.period, "2026-03");

        let all = build_report(&logs, &Period::all());
        assert_eq!(all.logs_count, 3);
        assert_eq!(all.stats.full_tank_count, 3);
    }

    #[test]
    fn report_carries_suggestion() {
        let logs = vec![
            log(0, 100_000.0, 50.0, true),
            log(1, 100_200.0, 20.0, false),
            log(2, 100_400.0, 20.0, false),
            log(3, 100_600.0, 20.0, false),
        ];
        let report = build_report(&logs, &Period::all());
        assert!(report.suggest_full_tank);
        assert_eq!(report.stats.partial_fill_count, 3);
        assert_eq!(report.stats.average_consumption_km_per_liter, None);
    }

    #[test]
    fn empty_period_yields_empty_report() {
        let logs = vec![log(0, 100_000.0, 50.0, true)];
        let report = build_report(&logs, &Period::month(date(2025, 1, 1)));
        assert_eq!(report.logs_count, 0);
        assert!(!report.suggest_full_tank);
        assert_eq!(report.stats, crate::types::FuelStatsSnapshot::empty());
    }
}
