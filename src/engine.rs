use crate::aggregate::{accumulate, aggregate};
use crate::cache::CacheManager;
use crate::clock::{Clock, SystemClock};
use crate::date::CanonicalDate;
use crate::errors::EngineError;
use crate::models::{
    CalculationConfig, CalculationConfigPatch, DailyTotals, DateRecord, PerformanceMetrics,
    ProductObservation, ProgressiveStoreSnapshot, RecalcOutcome, ValidationReport,
};
use crate::store::ProgressiveStore;
use crate::validate::validate;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ProgressiveEngine {
    pub(crate) store: ProgressiveStore,
    cache: CacheManager,
    clock: Arc<dyn Clock>,
    calculation_time_ms: f64,
    entries_processed: u64,
}

impl Default for ProgressiveEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ProgressiveEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: ProgressiveStore::default(),
            cache: CacheManager::default(),
            clock,
            calculation_time_ms: 0.0,
            entries_processed: 0,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = CacheManager::new(ttl);
        self
    }

    /// A rejected batch leaves the store untouched.
    pub fn update_and_recalculate(
        &mut self,
        date: CanonicalDate,
        observations: Vec<ProductObservation>,
    ) -> Result<RecalcOutcome, EngineError> {
        let report = validate(&observations);
        if !report.is_valid {
            warn!(%date, errors = ?report.errors, "write rejected");
            return Err(EngineError::Validation(report));
        }
        for warning in &report.warnings {
            warn!(%date, "{warning}");
        }

        self.write(date, observations);
        self.cache.invalidate(date);
        self.recalculate();
        self.store.last_updated = Some(self.clock.now());

        let record = self
            .store
            .records
            .get(&date)
            .cloned()
            .ok_or(EngineError::MissingRecord(date))?;
        debug!(%date, sold = record.cumulative_totals.total_sold, "date recalculated");

        Ok(RecalcOutcome {
            cumulative_totals: record.cumulative_totals,
            record,
            warnings: report.warnings,
        })
    }

    /// One bad day rejects the whole batch. Later duplicates of a date win.
    pub fn load_batch(
        &mut self,
        days: Vec<(CanonicalDate, Vec<ProductObservation>)>,
    ) -> Result<ValidationReport, EngineError> {
        let combined = validate_days(days.iter().map(|(date, observations)| (*date, observations.as_slice())));
        if !combined.is_valid {
            warn!(days = days.len(), errors = combined.errors.len(), "batch rejected");
            return Err(EngineError::Validation(combined));
        }

        let Some(earliest) = days.iter().map(|(date, _)| *date).min() else {
            return Ok(combined);
        };
        let count = days.len();
        for (date, observations) in days {
            self.write(date, observations);
        }
        self.cache.invalidate(earliest);
        self.recalculate();
        self.store.last_updated = Some(self.clock.now());
        info!(days = count, %earliest, "batch loaded");

        Ok(combined)
    }

    pub fn remove(&mut self, date: CanonicalDate) -> Option<DateRecord> {
        let removed = self.store.remove(&date)?;
        self.cache.invalidate(date);
        self.cache.forget(date);
        self.recalculate();
        self.store.last_updated = Some(self.clock.now());
        info!(%date, "date removed");
        Some(removed)
    }

    /// Keeps the calculation config.
    pub fn reset(&mut self) {
        let config = self.store.config;
        self.store = ProgressiveStore {
            config,
            last_updated: Some(self.clock.now()),
            ..Default::default()
        };
        self.cache.invalidate_all();
    }

    pub fn rebuild(&mut self) {
        self.cache.invalidate_all();
        self.recalculate();
    }

    pub fn export_state(&self) -> ProgressiveStoreSnapshot {
        self.store.snapshot()
    }

    /// An invalid snapshot is rejected and the current store is kept.
    pub fn import_state(&mut self, snapshot: ProgressiveStoreSnapshot) -> Result<(), EngineError> {
        let report = validate_days(
            snapshot
                .records
                .iter()
                .map(|(date, record)| (*date, record.observations.as_slice())),
        );
        if !report.is_valid {
            warn!(errors = ?report.errors, "snapshot rejected");
            return Err(EngineError::Validation(report));
        }

        self.store = ProgressiveStore::from_snapshot(snapshot);
        self.rebuild();
        info!(dates = self.store.len(), "state imported");
        Ok(())
    }

    pub fn update_config(&mut self, patch: CalculationConfigPatch) -> CalculationConfig {
        self.store.config.apply(patch);
        self.cache.invalidate_all();
        self.store.config
    }

    pub fn config(&self) -> CalculationConfig {
        self.store.config
    }

    pub fn first_date(&self) -> Option<CanonicalDate> {
        self.store.first_date()
    }

    pub fn cumulative(&self, date: CanonicalDate) -> Option<DailyTotals> {
        self.store.cumulative_index.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get_performance_metrics(&self) -> PerformanceMetrics {
        let stats = self.cache.stats();
        PerformanceMetrics {
            calculation_time_ms: self.calculation_time_ms,
            entries_processed: self.entries_processed,
            cache_hits: stats.hits,
            cache_misses: stats.misses,
        }
    }

    pub fn reset_performance_metrics(&mut self) {
        self.calculation_time_ms = 0.0;
        self.entries_processed = 0;
        self.cache.reset_stats();
    }

    fn write(&mut self, date: CanonicalDate, observations: Vec<ProductObservation>) {
        let started = self.clock.now();
        let daily_totals = aggregate(&observations);
        self.track_time(started);
        self.entries_processed += observations.len() as u64;

        self.store.put(DateRecord {
            date,
            observations,
            daily_totals,
            cumulative_totals: daily_totals,
            previous_cumulative_totals: None,
        });
    }

    /// Clean dates hand their memoized total forward; dirty ones are recomputed.
    fn recalculate(&mut self) {
        let started = self.clock.now();
        let dates = self.cache.sorted_dates(&self.store.records, self.clock.as_ref());

        let mut previous: Option<DailyTotals> = None;
        let mut recomputed = 0usize;
        for date in dates {
            if let Some(cached) = self.cache.memoized(date) {
                previous = Some(cached);
                continue;
            }
            let Some(record) = self.store.records.get_mut(&date) else {
                continue;
            };

            let cumulative = accumulate(&record.daily_totals, previous.as_ref());
            record.cumulative_totals = cumulative;
            record.previous_cumulative_totals = previous;
            self.store.cumulative_index.insert(date, cumulative);
            self.cache.store(date, cumulative);
            previous = Some(cumulative);
            recomputed += 1;
        }
        self.cache.settle();
        self.track_time(started);
        debug!(recomputed, total = self.store.len(), "recalculation pass finished");
    }

    fn track_time(&mut self, started: chrono::DateTime<chrono::Utc>) {
        let elapsed = self.clock.now() - started;
        if let Some(micros) = elapsed.num_microseconds() {
            self.calculation_time_ms += micros as f64 / 1000.0;
        }
    }
}

fn validate_days<'a>(
    days: impl Iterator<Item = (CanonicalDate, &'a [ProductObservation])>,
) -> ValidationReport {
    let mut combined = ValidationReport {
        is_valid: true,
        ..Default::default()
    };
    for (date, observations) in days {
        let report = validate(observations);
        combined.is_valid &= report.is_valid;
        combined
            .errors
            .extend(report.errors.into_iter().map(|e| format!("{date}: {e}")));
        combined
            .warnings
            .extend(report.warnings.into_iter().map(|w| format!("{date}: {w}")));
    }
    combined
}
