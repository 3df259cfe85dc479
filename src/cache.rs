use crate::clock::Clock;
use crate::date::CanonicalDate;
use crate::models::DailyTotals;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const DEFAULT_SORTED_DATES_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct CacheManager {
    ttl: Duration,
    sorted_dates: Option<Vec<CanonicalDate>>,
    sorted_dates_fetched_at: Option<DateTime<Utc>>,
    memo: BTreeMap<CanonicalDate, DailyTotals>,
    dirty: BTreeSet<CanonicalDate>,
    stats: CacheStats,
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SORTED_DATES_TTL_SECS))
    }
}

impl CacheManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sorted_dates: None,
            sorted_dates_fetched_at: None,
            memo: BTreeMap::new(),
            dirty: BTreeSet::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn sorted_dates<V>(
        &mut self,
        records: &BTreeMap<CanonicalDate, V>,
        clock: &dyn Clock,
    ) -> Vec<CanonicalDate> {
        let now = clock.now();
        if self.dirty.is_empty() {
            if let (Some(dates), Some(fetched_at)) = (&self.sorted_dates, self.sorted_dates_fetched_at) {
                if now - fetched_at < self.ttl {
                    self.stats.hits += 1;
                    return dates.clone();
                }
            }
        }

        self.stats.misses += 1;
        let dates: Vec<CanonicalDate> = records.keys().copied().collect();
        debug!(count = dates.len(), "sorted dates repopulated");
        self.sorted_dates = Some(dates.clone());
        self.sorted_dates_fetched_at = Some(now);
        dates
    }

    /// Marks `from_date` and every later known date dirty.
    pub fn invalidate(&mut self, from_date: CanonicalDate) {
        self.dirty.insert(from_date);
        self.dirty.extend(self.memo.range(from_date..).map(|(date, _)| *date));
        if let Some(dates) = &self.sorted_dates {
            self.dirty.extend(dates.iter().filter(|date| **date >= from_date).copied());
        }
        self.sorted_dates = None;
        self.sorted_dates_fetched_at = None;
    }

    pub fn invalidate_all(&mut self) {
        self.sorted_dates = None;
        self.sorted_dates_fetched_at = None;
        self.memo.clear();
        self.dirty.clear();
    }

    pub fn memoized(&mut self, date: CanonicalDate) -> Option<DailyTotals> {
        if self.dirty.contains(&date) {
            self.stats.misses += 1;
            return None;
        }
        match self.memo.get(&date) {
            Some(totals) => {
                self.stats.hits += 1;
                Some(*totals)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn store(&mut self, date: CanonicalDate, totals: DailyTotals) {
        self.memo.insert(date, totals);
        self.dirty.remove(&date);
    }

    pub fn forget(&mut self, date: CanonicalDate) {
        self.memo.remove(&date);
        self.dirty.remove(&date);
    }

    pub fn settle(&mut self) {
        self.dirty.clear();
    }

    pub fn is_dirty(&self, date: &CanonicalDate) -> bool {
        self.dirty.contains(date)
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}
