use crate::aggregate::aggregate;
use crate::date::CanonicalDate;
use crate::models::{CalculationConfig, DailyTotals, DateRecord, ProgressiveStoreSnapshot};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// System of record: per-date records plus their cumulative totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressiveStore {
    pub records: BTreeMap<CanonicalDate, DateRecord>,
    pub cumulative_index: BTreeMap<CanonicalDate, DailyTotals>,
    pub config: CalculationConfig,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressiveStore {
    /// Earliest date with data; moves whenever an earlier date is written.
    pub fn first_date(&self) -> Option<CanonicalDate> {
        self.records.keys().next().copied()
    }

    /// Replaces the record for `record.date`. Cumulative totals start out
    /// equal to the daily totals until the next recalculation pass.
    pub fn put(&mut self, record: DateRecord) -> Option<DateRecord> {
        self.records.insert(record.date, record)
    }

    pub fn remove(&mut self, date: &CanonicalDate) -> Option<DateRecord> {
        self.cumulative_index.remove(date);
        self.records.remove(date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> ProgressiveStoreSnapshot {
        ProgressiveStoreSnapshot {
            records: self.records.clone(),
            cumulative_index: self.cumulative_index.clone(),
            config: self.config,
            last_updated: self.last_updated,
            first_date: self.first_date(),
        }
    }

    /// Rebuilds a store from a snapshot. Only observations are trusted: daily
    /// totals are re-aggregated and cumulative totals wait for the next pass.
    pub fn from_snapshot(snapshot: ProgressiveStoreSnapshot) -> Self {
        let records = snapshot
            .records
            .into_iter()
            .map(|(date, mut record)| {
                record.date = date;
                record.daily_totals = aggregate(&record.observations);
                record.cumulative_totals = record.daily_totals;
                record.previous_cumulative_totals = None;
                (date, record)
            })
            .collect();
        Self {
            records,
            cumulative_index: BTreeMap::new(),
            config: snapshot.config,
            last_updated: snapshot.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductObservation;

    fn record(day: u32, sold: f64) -> DateRecord {
        let observations = vec![ProductObservation::new("A", sold, 0.0, 0.0, 1.0)];
        let daily_totals = aggregate(&observations);
        DateRecord {
            date: CanonicalDate::from_ymd(2025, 5, day).unwrap(),
            observations,
            daily_totals,
            cumulative_totals: daily_totals,
            previous_cumulative_totals: None,
        }
    }

    #[test]
    fn put_replaces_and_first_date_tracks_minimum() {
        let mut store = ProgressiveStore::default();
        assert!(store.first_date().is_none());

        store.put(record(10, 1.0));
        store.put(record(3, 2.0));
        assert_eq!(store.first_date(), CanonicalDate::from_ymd(2025, 5, 3));

        let replaced = store.put(record(10, 9.0)).unwrap();
        assert_eq!(replaced.daily_totals.total_sold, 1.0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_keys_win_over_embedded_dates() {
        let mut store = ProgressiveStore::default();
        store.put(record(1, 1.0));
        let mut snapshot = store.snapshot();
        let key = CanonicalDate::from_ymd(2025, 5, 2).unwrap();
        let moved = snapshot.records.remove(&CanonicalDate::from_ymd(2025, 5, 1).unwrap()).unwrap();
        snapshot.records.insert(key, moved);

        let restored = ProgressiveStore::from_snapshot(snapshot);
        assert_eq!(restored.records[&key].date, key);
        assert!(restored.cumulative_index.is_empty());
    }

    #[test]
    fn snapshot_daily_totals_are_reaggregated() {
        let mut store = ProgressiveStore::default();
        store.put(record(1, 1.0));
        let mut snapshot = store.snapshot();
        let key = CanonicalDate::from_ymd(2025, 5, 1).unwrap();
        let stale = snapshot.records.get_mut(&key).unwrap();
        stale.observations[0].sold = 10.0;
        stale.previous_cumulative_totals = Some(DailyTotals::default());

        let restored = ProgressiveStore::from_snapshot(snapshot);
        let record = &restored.records[&key];
        assert_eq!(record.daily_totals.total_sold, 10.0);
        assert_eq!(record.cumulative_totals, record.daily_totals);
        assert!(record.previous_cumulative_totals.is_none());
    }
}
