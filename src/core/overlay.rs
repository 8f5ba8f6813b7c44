use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{EventMarker, LifeEvent};

/// Net signed cashflow per day offset from the projection origin.
///
/// Only strictly positive offsets are kept; events on or before `start` are
/// already reflected in the history the projection starts from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashflowOverlay {
    by_day: BTreeMap<u32, f64>,
}

impl CashflowOverlay {
    pub fn build(start: NaiveDate, events: &[LifeEvent]) -> Self {
        let mut by_day = BTreeMap::new();
        for event in events {
            let offset = (event.date - start).num_days();
            if offset <= 0 {
                continue;
            }
            let Ok(day) = u32::try_from(offset) else {
                continue;
            };
            *by_day.entry(day).or_insert(0.0) += event.signed_amount();
        }
        Self { by_day }
    }

    pub fn amount_on(&self, day: u32) -> f64 {
        self.by_day.get(&day).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// Marker for the half-open bucket `(after, through]`.
    ///
    /// The sign of the bucket's net flow picks the marker; a bucket whose
    /// events cancel out is still flagged as income.
    pub fn marker_between(&self, after: u32, through: u32) -> Option<EventMarker> {
        if through <= after {
            return None;
        }
        let mut hit = false;
        let mut net = 0.0;
        for (_, amount) in self.by_day.range(after + 1..=through) {
            hit = true;
            net += amount;
        }
        match (hit, net < 0.0) {
            (false, _) => None,
            (true, true) => Some(EventMarker::Expense),
            (true, false) => Some(EventMarker::Income),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EventKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn event(on: NaiveDate, amount: f64, kind: EventKind) -> LifeEvent {
        LifeEvent {
            date: on,
            amount,
            kind,
            category: None,
        }
    }

    #[test]
    fn events_land_on_their_day_offset() {
        let start = date(2024, 1, 1);
        let overlay = CashflowOverlay::build(
            start,
            &[
                event(date(2024, 1, 11), 5_000.0, EventKind::Income),
                event(date(2024, 2, 1), 2_000.0, EventKind::Expense),
            ],
        );
        assert_eq!(overlay.amount_on(10), 5_000.0);
        assert_eq!(overlay.amount_on(31), -2_000.0);
        assert_eq!(overlay.amount_on(11), 0.0);
    }

    #[test]
    fn same_day_events_are_summed() {
        let start = date(2024, 1, 1);
        let overlay = CashflowOverlay::build(
            start,
            &[
                event(date(2024, 1, 5), 1_000.0, EventKind::Income),
                event(date(2024, 1, 5), -300.0, EventKind::Expense),
                event(date(2024, 1, 5), 50.0, EventKind::Income),
            ],
        );
        assert_eq!(overlay.amount_on(4), 750.0);
    }

    #[test]
    fn past_and_same_day_events_are_dropped() {
        let start = date(2024, 6, 1);
        let overlay = CashflowOverlay::build(
            start,
            &[
                event(date(2024, 6, 1), 1_000.0, EventKind::Income),
                event(date(2023, 1, 1), 1_000.0, EventKind::Income),
            ],
        );
        assert!(overlay.is_empty());
    }

    #[test]
    fn markers_cover_half_open_buckets() {
        let start = date(2024, 1, 1);
        let overlay = CashflowOverlay::build(
            start,
            &[
                event(date(2024, 1, 31), 100.0, EventKind::Income),
                event(date(2024, 2, 15), 400.0, EventKind::Expense),
            ],
        );
        // day 30 and day 45
        assert_eq!(overlay.marker_between(0, 30), Some(EventMarker::Income));
        assert_eq!(overlay.marker_between(30, 60), Some(EventMarker::Expense));
        assert_eq!(overlay.marker_between(60, 90), None);
        assert_eq!(overlay.marker_between(0, 29), None);
    }

    #[test]
    fn net_sign_decides_mixed_bucket() {
        let start = date(2024, 1, 1);
        let overlay = CashflowOverlay::build(
            start,
            &[
                event(date(2024, 1, 3), 100.0, EventKind::Income),
                event(date(2024, 1, 4), 500.0, EventKind::Expense),
            ],
        );
        assert_eq!(overlay.marker_between(0, 30), Some(EventMarker::Expense));
    }
}
