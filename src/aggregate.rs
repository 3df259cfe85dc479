use crate::models::{DailyTotals, ProductObservation};

/// Sums one date's observations. Sell-in is priced per product at its own net price.
pub fn aggregate(observations: &[ProductObservation]) -> DailyTotals {
    observations
        .iter()
        .fold(DailyTotals::default(), |acc, obs| DailyTotals {
            total_sold: acc.total_sold + obs.sold,
            total_stock: acc.total_stock + obs.stock,
            total_ordered: acc.total_ordered + obs.ordered,
            sell_in: acc.sell_in + obs.sell_in(),
        })
}

/// Cumulative total for a date given the cumulative total of the previous
/// date with data, if any.
pub fn accumulate(daily: &DailyTotals, previous: Option<&DailyTotals>) -> DailyTotals {
    match previous {
        None => DailyTotals {
            total_sold: daily.total_sold,
            total_stock: daily.total_ordered - daily.total_sold,
            total_ordered: daily.total_ordered,
            sell_in: daily.sell_in,
        },
        Some(prev) => DailyTotals {
            total_sold: prev.total_sold + daily.total_sold,
            total_stock: prev.total_stock + (daily.total_ordered - daily.total_sold),
            total_ordered: prev.total_ordered + daily.total_ordered,
            sell_in: prev.sell_in + daily.sell_in,
        },
    }
}

/// Sell-in of a set of raw observations.
pub fn sell_in(observations: &[ProductObservation]) -> f64 {
    observations.iter().map(ProductObservation::sell_in).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_each_field_and_prices_per_product() {
        let totals = aggregate(&[
            ProductObservation::new("A", 2.0, 10.0, 4.0, 1.5),
            ProductObservation::new("B", 3.0, 5.0, 2.0, 10.0),
        ]);
        assert_eq!(totals.total_sold, 5.0);
        assert_eq!(totals.total_stock, 15.0);
        assert_eq!(totals.total_ordered, 6.0);
        assert_eq!(totals.sell_in, 26.0);
    }

    #[test]
    fn empty_day_is_zero() {
        assert_eq!(aggregate(&[]), DailyTotals::default());
    }

    #[test]
    fn first_day_seeds_stock_from_ordered_minus_sold() {
        let daily = DailyTotals {
            total_sold: 3.0,
            total_stock: 99.0,
            total_ordered: 10.0,
            sell_in: 20.0,
        };
        let first = accumulate(&daily, None);
        assert_eq!(first.total_stock, 7.0);
        assert_eq!(first.total_sold, 3.0);

        let second = accumulate(&daily, Some(&first));
        assert_eq!(second.total_sold, 6.0);
        assert_eq!(second.total_ordered, 20.0);
        assert_eq!(second.total_stock, 14.0);
        assert_eq!(second.sell_in, 40.0);
    }
}
