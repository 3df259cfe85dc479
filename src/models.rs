use crate::date::CanonicalDate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product's reported numbers for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductObservation {
    pub product_id: String,
    pub sold: f64,
    pub stock: f64,
    pub ordered: f64,
    pub net_price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl ProductObservation {
    pub fn new(product_id: impl Into<String>, sold: f64, stock: f64, ordered: f64, net_price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            sold,
            stock,
            ordered,
            net_price,
            category: String::new(),
            color: String::new(),
            tooltip: None,
        }
    }

    pub fn sell_in(&self) -> f64 {
        self.ordered * self.net_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DailyTotals {
    pub total_sold: f64,
    pub total_stock: f64,
    pub total_ordered: f64,
    pub sell_in: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRecord {
    pub date: CanonicalDate,
    pub observations: Vec<ProductObservation>,
    pub daily_totals: DailyTotals,
    pub cumulative_totals: DailyTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cumulative_totals: Option<DailyTotals>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    pub unit_price: f64,
    pub sales_tax: f64,
    pub discount_pct: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            unit_price: 1.0,
            sales_tax: 0.22,
            discount_pct: 0.0,
        }
    }
}

/// Partial update for [`CalculationConfig`]; absent fields keep their value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CalculationConfigPatch {
    pub unit_price: Option<f64>,
    pub sales_tax: Option<f64>,
    pub discount_pct: Option<f64>,
}

impl CalculationConfig {
    pub fn apply(&mut self, patch: CalculationConfigPatch) {
        if let Some(value) = patch.unit_price {
            self.unit_price = value;
        }
        if let Some(value) = patch.sales_tax {
            self.sales_tax = value;
        }
        if let Some(value) = patch.discount_pct {
            self.discount_pct = value;
        }
    }
}

/// Serialized form of the whole store, handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProgressiveStoreSnapshot {
    pub records: BTreeMap<CanonicalDate, DateRecord>,
    pub cumulative_index: BTreeMap<CanonicalDate, DailyTotals>,
    pub config: CalculationConfig,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_date: Option<CanonicalDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalcOutcome {
    pub record: DateRecord,
    pub cumulative_totals: DailyTotals,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Original,
    Progressive,
}

/// What a calendar cell shows for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub date: CanonicalDate,
    pub display_mode: DisplayMode,
    pub is_first_day: bool,
    pub original_rows: Vec<ProductObservation>,
    pub rows: Vec<ProductObservation>,
    pub daily_totals: DailyTotals,
    pub totals: DailyTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformanceMetrics {
    pub calculation_time_ms: f64,
    pub entries_processed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Observation as received over the wire, before coercion.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ObservationInput {
    #[serde(default)]
    pub product_id: Option<String>,
    pub sold: Option<f64>,
    pub stock: Option<f64>,
    pub ordered: Option<f64>,
    pub net_price: Option<f64>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub tooltip: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct DayWriteRequest {
    pub observations: Vec<ObservationInput>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ActiveDatesQuery {
    /// Comma-separated `YYYY-MM-DD` list.
    pub active: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SellInResponse {
    pub sell_in: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchLoadResponse {
    pub loaded_days: usize,
    pub skipped_entries: usize,
    pub first_date: Option<CanonicalDate>,
    pub warnings: Vec<String>,
}
