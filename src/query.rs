use crate::aggregate::sell_in;
use crate::date::CanonicalDate;
use crate::engine::ProgressiveEngine;
use crate::models::{CellView, DailyTotals, DateRecord, DisplayMode, ProductObservation};
use std::collections::{BTreeSet, HashMap};

impl ProgressiveEngine {
    pub fn get_record(&self, date: CanonicalDate) -> Option<DateRecord> {
        self.store.records.get(&date).cloned()
    }

    /// Records between `start` and `end` inclusive, oldest first.
    pub fn get_history(&self, start: CanonicalDate, end: CanonicalDate) -> Vec<DateRecord> {
        if start > end {
            return Vec::new();
        }
        self.store
            .records
            .range(start..=end)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Display data for one calendar cell.
    ///
    /// The first date with data shows the raw observations. Every later date
    /// shows per-product totals accumulated from the start of its month.
    pub fn get_cell_display(&self, date: CanonicalDate) -> CellView {
        let Some(record) = self.store.records.get(&date) else {
            return CellView {
                date,
                display_mode: DisplayMode::Original,
                is_first_day: false,
                original_rows: Vec::new(),
                rows: Vec::new(),
                daily_totals: DailyTotals::default(),
                totals: DailyTotals::default(),
            };
        };

        let is_first_day = self.store.first_date() == Some(date);
        let (display_mode, rows) = if is_first_day {
            (DisplayMode::Original, record.observations.clone())
        } else {
            (DisplayMode::Progressive, self.month_to_date_rows(date))
        };

        CellView {
            date,
            display_mode,
            is_first_day,
            original_rows: record.observations.clone(),
            rows,
            daily_totals: record.daily_totals,
            totals: record.cumulative_totals,
        }
    }

    pub fn get_total_sell_in(&self, active_dates: Option<&[CanonicalDate]>) -> f64 {
        let active = active_dates.map(|dates| dates.iter().copied().collect::<BTreeSet<_>>());
        self.store
            .records
            .iter()
            .filter(|(date, _)| active.as_ref().is_none_or(|set| set.contains(*date)))
            .map(|(_, record)| sell_in(&record.observations))
            .sum()
    }

    pub fn get_monthly_sell_in(
        &self,
        year: i32,
        month: u32,
        active_dates: Option<&[CanonicalDate]>,
    ) -> f64 {
        let Some(start) = CanonicalDate::from_ymd(year, month, 1) else {
            return 0.0;
        };
        let active = active_dates.map(|dates| dates.iter().copied().collect::<BTreeSet<_>>());
        self.store
            .records
            .range(start..)
            .take_while(|(date, _)| date.in_month(year, month))
            .filter(|(date, _)| active.as_ref().is_none_or(|set| set.contains(*date)))
            .map(|(_, record)| sell_in(&record.observations))
            .sum()
    }

    fn month_to_date_rows(&self, date: CanonicalDate) -> Vec<ProductObservation> {
        let mut rows: Vec<ProductObservation> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (_, record) in self.store.records.range(date.month_start()..=date) {
            for obs in &record.observations {
                match positions.get(&obs.product_id) {
                    Some(&index) => {
                        let row = &mut rows[index];
                        row.sold += obs.sold;
                        row.ordered += obs.ordered;
                        row.stock = (row.stock + obs.ordered - obs.sold).max(0.0);
                        row.net_price = obs.net_price;
                        row.category.clone_from(&obs.category);
                        row.color.clone_from(&obs.color);
                        row.tooltip.clone_from(&obs.tooltip);
                    }
                    None => {
                        let mut row = obs.clone();
                        row.stock = (obs.ordered - obs.sold).max(0.0);
                        positions.insert(obs.product_id.clone(), rows.len());
                        rows.push(row);
                    }
                }
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductObservation;

    fn date(y: i32, m: u32, d: u32) -> CanonicalDate {
        CanonicalDate::from_ymd(y, m, d).unwrap()
    }

    fn obs(id: &str, sold: f64, stock: f64, ordered: f64, price: f64) -> ProductObservation {
        ProductObservation::new(id, sold, stock, ordered, price)
    }

    #[test]
    fn first_day_shows_raw_rows() {
        let mut engine = ProgressiveEngine::default();
        let raw = vec![obs("A", 2.0, 8.0, 3.0, 1.0), obs("B", 0.0, 4.0, 1.0, 2.0)];
        engine.update_and_recalculate(date(2025, 4, 2), raw.clone()).unwrap();

        let view = engine.get_cell_display(date(2025, 4, 2));
        assert_eq!(view.display_mode, DisplayMode::Original);
        assert!(view.is_first_day);
        assert_eq!(view.rows, raw);
        assert_eq!(view.totals, engine.cumulative(date(2025, 4, 2)).unwrap());
    }

    #[test]
    fn earlier_write_turns_first_day_progressive() {
        let mut engine = ProgressiveEngine::default();
        engine.update_and_recalculate(date(2025, 7, 30), vec![obs("A", 31.0, 0.0, 0.0, 1.0)]).unwrap();
        assert_eq!(engine.get_cell_display(date(2025, 7, 30)).display_mode, DisplayMode::Original);

        engine.update_and_recalculate(date(2025, 1, 15), vec![obs("A", 50.0, 0.0, 0.0, 1.0)]).unwrap();
        let view = engine.get_cell_display(date(2025, 7, 30));
        assert_eq!(view.display_mode, DisplayMode::Progressive);
        assert!(!view.is_first_day);
        assert_eq!(view.totals.total_sold, 81.0);
        // month-to-date rows only see July
        assert_eq!(view.rows[0].sold, 31.0);
    }

    #[test]
    fn month_to_date_stock_never_goes_negative() {
        let mut engine = ProgressiveEngine::default();
        engine.update_and_recalculate(date(2025, 6, 28), vec![obs("A", 0.0, 0.0, 100.0, 1.0)]).unwrap();
        engine.update_and_recalculate(date(2025, 7, 1), vec![obs("A", 2.0, 0.0, 5.0, 1.0)]).unwrap();
        engine.update_and_recalculate(date(2025, 7, 2), vec![obs("A", 10.0, 0.0, 0.0, 1.0)]).unwrap();

        let day_one = engine.get_cell_display(date(2025, 7, 1));
        assert_eq!(day_one.rows[0].stock, 3.0);

        let view = engine.get_cell_display(date(2025, 7, 2));
        assert_eq!(view.display_mode, DisplayMode::Progressive);
        let row = &view.rows[0];
        assert_eq!(row.sold, 12.0);
        assert_eq!(row.ordered, 5.0);
        assert_eq!(row.stock, 0.0);
    }

    #[test]
    fn products_keep_first_seen_order() {
        let mut engine = ProgressiveEngine::default();
        engine.update_and_recalculate(date(2025, 9, 1), vec![obs("Z", 1.0, 0.0, 1.0, 1.0)]).unwrap();
        engine
            .update_and_recalculate(date(2025, 9, 2), vec![obs("A", 1.0, 0.0, 3.0, 1.0), obs("Z", 1.0, 0.0, 1.0, 1.0)])
            .unwrap();

        let view = engine.get_cell_display(date(2025, 9, 2));
        let ids: Vec<&str> = view.rows.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A"]);
        assert_eq!(view.rows[0].sold, 2.0);
    }

    #[test]
    fn missing_date_gives_empty_view() {
        let engine = ProgressiveEngine::default();
        let view = engine.get_cell_display(date(2025, 1, 1));
        assert!(view.rows.is_empty());
        assert!(!view.is_first_day);
        assert_eq!(view.totals, DailyTotals::default());
        assert!(engine.get_record(date(2025, 1, 1)).is_none());
    }

    #[test]
    fn history_is_inclusive_and_sorted() {
        let mut engine = ProgressiveEngine::default();
        for day in [9, 3, 6, 12] {
            engine.update_and_recalculate(date(2025, 2, day), vec![]).unwrap();
        }
        let history = engine.get_history(date(2025, 2, 3), date(2025, 2, 9));
        let days: Vec<String> = history.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(days, vec!["2025-02-03", "2025-02-06", "2025-02-09"]);
        assert!(engine.get_history(date(2025, 2, 9), date(2025, 2, 3)).is_empty());
    }

    #[test]
    fn sell_in_queries_respect_active_dates() {
        let mut engine = ProgressiveEngine::default();
        engine.update_and_recalculate(date(2025, 3, 31), vec![obs("A", 0.0, 0.0, 2.0, 5.0)]).unwrap();
        engine.update_and_recalculate(date(2025, 4, 1), vec![obs("A", 0.0, 0.0, 3.0, 2.0)]).unwrap();
        engine
            .update_and_recalculate(date(2025, 4, 30), vec![obs("A", 0.0, 0.0, 1.0, 4.0), obs("B", 0.0, 0.0, 2.0, 0.5)])
            .unwrap();

        assert_eq!(engine.get_total_sell_in(None), 21.0);
        assert_eq!(engine.get_monthly_sell_in(2025, 4, None), 11.0);
        assert_eq!(engine.get_monthly_sell_in(2025, 3, None), 10.0);

        let active = [date(2025, 4, 30)];
        assert_eq!(engine.get_total_sell_in(Some(&active)), 5.0);
        assert_eq!(engine.get_monthly_sell_in(2025, 4, Some(&active)), 5.0);
        assert_eq!(engine.get_monthly_sell_in(2025, 13, None), 0.0);
    }
}
