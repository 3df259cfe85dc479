use crate::date::CanonicalDate;
use crate::errors::EngineError;
use crate::models::ProductObservation;
use crate::validate::coerce_number;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_NET_PRICE: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FocusReference {
    pub reference_id: String,
    #[serde(default)]
    pub ordered_pieces: String,
    #[serde(default)]
    pub sold_pieces: String,
    #[serde(default)]
    pub stock_pieces: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_vs_stock_percentage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarEntry {
    #[serde(default)]
    pub id: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: String,
    #[serde(default)]
    pub focus_references: Vec<FocusReference>,
}

impl CalendarEntry {
    pub fn has_focus_data(&self) -> bool {
        !self.focus_references.is_empty()
    }

    pub fn canonical_date(&self) -> Result<CanonicalDate, EngineError> {
        CanonicalDate::parse_lenient(&self.date)
    }

    pub fn to_observations(&self) -> Vec<ProductObservation> {
        self.focus_references.iter().map(to_observation).collect()
    }
}

/// Reads the leading number of `raw` ("12 pz" -> 12); `,` counts as a decimal point.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_separator = false;
    for (i, c) in trimmed.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' | ',' if !seen_separator => seen_separator = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].replace(',', ".").parse::<f64>().ok()
}

pub fn to_observation(reference: &FocusReference) -> ProductObservation {
    let id = reference.reference_id.trim();
    let net_price = match reference.net_price.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => coerce_number(parse_number(raw), 0.0, "net_price", id),
        _ => DEFAULT_NET_PRICE,
    };

    ProductObservation {
        product_id: id.to_string(),
        sold: coerce_number(parse_number(&reference.sold_pieces), 0.0, "sold", id),
        stock: coerce_number(parse_number(&reference.stock_pieces), 0.0, "stock", id),
        ordered: coerce_number(parse_number(&reference.ordered_pieces), 0.0, "ordered", id),
        net_price,
        category: "Prodotto".to_string(),
        color: "green".to_string(),
        tooltip: Some(format!(
            "V: {}, S: {}, O: {}",
            reference.sold_pieces, reference.stock_pieces, reference.ordered_pieces
        )),
    }
}

pub fn to_focus_reference(obs: &ProductObservation) -> FocusReference {
    let percentage = if obs.stock > 0.0 {
        format!("{:.1}", obs.sold / obs.stock * 100.0)
    } else {
        "0.0".to_string()
    };
    FocusReference {
        reference_id: obs.product_id.clone(),
        ordered_pieces: obs.ordered.to_string(),
        sold_pieces: obs.sold.to_string(),
        stock_pieces: obs.stock.to_string(),
        net_price: Some(obs.net_price.to_string()),
        sold_vs_stock_percentage: Some(percentage),
    }
}

/// Returns the per-date batches and how many entries were skipped.
pub fn entries_to_batch(entries: &[CalendarEntry]) -> (Vec<(CanonicalDate, Vec<ProductObservation>)>, usize) {
    let mut batch = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for entry in entries {
        if !entry.has_focus_data() {
            skipped += 1;
            continue;
        }
        match entry.canonical_date() {
            Ok(date) => batch.push((date, entry.to_observations())),
            Err(err) => {
                warn!(id = %entry.id, "skipping calendar entry: {err}");
                skipped += 1;
            }
        }
    }
    (batch, skipped)
}
