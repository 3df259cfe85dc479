use crate::models::{ObservationInput, ProductObservation, ValidationReport};
use tracing::warn;

const SOLD_WARNING_THRESHOLD: f64 = 1000.0;
const STOCK_WARNING_THRESHOLD: f64 = 10000.0;

/// Checks a batch of observations before it is written.
///
/// Any error rejects the whole batch; warnings flag outliers but let it through.
pub fn validate(observations: &[ProductObservation]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, obs) in observations.iter().enumerate() {
        let label = if obs.product_id.trim().is_empty() {
            errors.push(format!("missing product_id for observation #{index}"));
            format!("#{index}")
        } else {
            obs.product_id.clone()
        };

        for (field, value) in [
            ("sold", obs.sold),
            ("stock", obs.stock),
            ("ordered", obs.ordered),
            ("net_price", obs.net_price),
        ] {
            if !value.is_finite() {
                errors.push(format!("non-finite {field} for {label}"));
            }
        }

        if obs.sold < 0.0 {
            errors.push(format!("negative sold not allowed for {label}: {}", obs.sold));
        }
        if obs.stock < 0.0 {
            errors.push(format!("negative stock not allowed for {label}: {}", obs.stock));
        }

        if obs.sold > SOLD_WARNING_THRESHOLD {
            warnings.push(format!("very high sold for {label}: {}", obs.sold));
        }
        if obs.stock > STOCK_WARNING_THRESHOLD {
            warnings.push(format!("very high stock for {label}: {}", obs.stock));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Replaces a missing or non-finite number with `default`, logging the repair.
pub fn coerce_number(value: Option<f64>, default: f64, field: &str, product_id: &str) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!(product_id, field, value = %v, default, "non-finite value coerced");
            default
        }
        None => {
            warn!(product_id, field, default, "missing value coerced");
            default
        }
    }
}

impl ObservationInput {
    /// Applies the coercion policy; `product_id` is left empty when absent so
    /// that validation rejects it.
    pub fn into_observation(self) -> ProductObservation {
        let product_id = self.product_id.unwrap_or_default().trim().to_string();
        ProductObservation {
            sold: coerce_number(self.sold, 0.0, "sold", &product_id),
            stock: coerce_number(self.stock, 0.0, "stock", &product_id),
            ordered: coerce_number(self.ordered, 0.0, "ordered", &product_id),
            net_price: coerce_number(self.net_price, 0.0, "net_price", &product_id),
            category: self.category.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            tooltip: self.tooltip.filter(|t| !t.is_empty()),
            product_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_sold_is_rejected_with_product_name() {
        let report = validate(&[ProductObservation::new("PBCO", -1.0, 5.0, 0.0, 2.0)]);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("PBCO"));
    }

    #[test]
    fn negative_stock_and_missing_id_are_errors() {
        let report = validate(&[
            ProductObservation::new("", 1.0, 1.0, 1.0, 1.0),
            ProductObservation::new("PUT2", 1.0, -3.0, 1.0, 1.0),
        ]);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("missing product_id")));
        assert!(report.errors.iter().any(|e| e.contains("PUT2")));
    }

    #[test]
    fn outliers_only_warn() {
        let report = validate(&[ProductObservation::new("PSU2", 1500.0, 20000.0, 0.0, 1.0)]);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn nan_is_an_error() {
        let report = validate(&[ProductObservation::new("PUB2", f64::NAN, 0.0, 0.0, 1.0)]);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("non-finite sold"));
    }

    #[test]
    fn empty_batch_is_valid() {
        let report = validate(&[]);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn coercion_fills_defaults() {
        assert_eq!(coerce_number(None, 0.0, "sold", "X"), 0.0);
        assert_eq!(coerce_number(Some(f64::INFINITY), 2.0, "net_price", "X"), 2.0);
        assert_eq!(coerce_number(Some(4.5), 0.0, "ordered", "X"), 4.5);
    }

    #[test]
    fn input_conversion_trims_and_coerces() {
        let input = ObservationInput {
            product_id: Some(" PBCO ".into()),
            sold: Some(3.0),
            ordered: None,
            tooltip: Some(String::new()),
            ..Default::default()
        };
        let obs = input.into_observation();
        assert_eq!(obs.product_id, "PBCO");
        assert_eq!(obs.sold, 3.0);
        assert_eq!(obs.ordered, 0.0);
        assert_eq!(obs.tooltip, None);
    }
}
