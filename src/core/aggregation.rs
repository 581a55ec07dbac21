//! Dashboard figures: per-category subtotals, paid/pending split and the
//! year list feeding the period selector.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ExpenseCategory, ExpenseRecord, PaymentStatus};

/// Optional year and month restriction; both absent means "all time".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterWindow {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl FilterWindow {
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    pub fn month(year: Option<i32>, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        self.year.map_or(true, |year| record.date.year() == year)
            && self.month.map_or(true, |month| record.date.month() == month)
    }

    pub fn label(&self) -> String {
        match (self.year, self.month) {
            (None, None) => "All time".to_string(),
            (Some(year), None) => format!("Year {year}"),
            (Some(year), Some(month)) => format!("{month:02}/{year}"),
            (None, Some(month)) => format!("Month {month:02} (all years)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub categories: Vec<CategoryTotal>,
    pub paid: Decimal,
    pub pending: Decimal,
    pub record_count: usize,
    pub window_label: String,
}

impl DashboardSummary {
    pub fn total(&self) -> Decimal {
        self.paid + self.pending
    }

    /// Share of the total already paid, 0–100.
    pub fn paid_percentage(&self) -> Decimal {
        let total = self.total();
        if total.is_zero() {
            return Decimal::ZERO;
        }
        (self.paid * Decimal::ONE_HUNDRED / total).round_dp(2)
    }

    pub fn category_sum(&self) -> Decimal {
        self.categories.iter().map(|c| c.amount).sum()
    }
}

/// Summarizes the records of `categories` that fall inside `window`.
///
/// Subtotals follow the declared order of `categories` and zero subtotals are
/// left out. Records of other categories do not contribute to any figure.
pub fn summarize(
    records: &[ExpenseRecord],
    categories: &[ExpenseCategory],
    window: FilterWindow,
) -> DashboardSummary {
    let matching: Vec<&ExpenseRecord> = records
        .iter()
        .filter(|record| categories.contains(&record.category) && window.matches(record))
        .collect();

    let totals = categories
        .iter()
        .map(|category| CategoryTotal {
            category: *category,
            amount: matching
                .iter()
                .filter(|record| record.category == *category)
                .map(|record| record.amount)
                .sum(),
        })
        .filter(|total| !total.amount.is_zero())
        .collect();

    let mut paid = Decimal::ZERO;
    let mut pending = Decimal::ZERO;
    for record in &matching {
        match record.status {
            PaymentStatus::Paid => paid += record.amount,
            PaymentStatus::Pending => pending += record.amount,
        }
    }

    DashboardSummary {
        categories: totals,
        paid,
        pending,
        record_count: matching.len(),
        window_label: window.label(),
    }
}

/// Distinct years present across all records, newest first.
pub fn available_years(records: &[ExpenseRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().map(|record| record.date.year()).collect();
    years.into_iter().rev().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: ExpenseCategory,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
}

/// Header figures for a single category screen.
pub fn category_stats(records: &[ExpenseRecord], category: ExpenseCategory) -> CategoryStats {
    let (total, count) = records
        .iter()
        .filter(|record| record.category == category)
        .fold((Decimal::ZERO, 0usize), |(sum, n), record| {
            (sum + record.amount, n + 1)
        });
    let average = if count == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(count)).round_dp(2)
    };
    CategoryStats {
        category,
        total,
        count,
        average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryDomain, DueDate};

    fn record(
        category: ExpenseCategory,
        date: &str,
        cents: i64,
        status: PaymentStatus,
    ) -> ExpenseRecord {
        let date: DueDate = date.parse().unwrap();
        ExpenseRecord::new(category, "item", Decimal::new(cents, 2), date)
            .unwrap()
            .with_status(status)
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            record(ExpenseCategory::Fee, "2024-03-10", 50_000, PaymentStatus::Paid),
            record(ExpenseCategory::Fee, "2024-04-10", 50_000, PaymentStatus::Pending),
            record(ExpenseCategory::Installment, "2024-03-05", 123_456, PaymentStatus::Pending),
            record(ExpenseCategory::Note, "2023-03-01", 9_999, PaymentStatus::Paid),
            record(ExpenseCategory::Utilities, "2023-12-20", 31_017, PaymentStatus::Pending),
            record(ExpenseCategory::Buffet, "2024-03-15", 1_000_000, PaymentStatus::Paid),
            record(ExpenseCategory::Fee, "2024-02-31", 10, PaymentStatus::Paid),
        ]
    }

    #[test]
    fn totals_agree_under_every_filter() {
        let records = sample();
        let mut windows = vec![FilterWindow::all_time()];
        for year in [2022, 2023, 2024] {
            windows.push(FilterWindow::year(year));
            for month in 1..=12 {
                windows.push(FilterWindow::month(Some(year), month));
            }
        }
        for month in 1..=12 {
            windows.push(FilterWindow::month(None, month));
        }
        for domain in [CategoryDomain::Apartment, CategoryDomain::Wedding] {
            for window in &windows {
                let summary = summarize(&records, domain.categories(), *window);
                let straight: Decimal = records
                    .iter()
                    .filter(|r| domain.categories().contains(&r.category) && window.matches(r))
                    .map(|r| r.amount)
                    .sum();
                assert_eq!(summary.category_sum(), summary.total());
                assert_eq!(summary.total(), straight);
            }
        }
    }

    #[test]
    fn year_and_month_filter_selects_prefix() {
        let records = sample();
        let window = FilterWindow::month(Some(2024), 3);
        let selected: Vec<_> = records.iter().filter(|r| window.matches(r)).collect();
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|r| r.date.as_str().starts_with("2024-03")));
        assert_eq!(
            records.iter().filter(|r| FilterWindow::all_time().matches(r)).count(),
            records.len()
        );
    }

    #[test]
    fn zero_categories_are_dropped_and_order_is_declared() {
        let records = sample();
        let summary = summarize(
            &records,
            CategoryDomain::Apartment.categories(),
            FilterWindow::year(2024),
        );
        let order: Vec<_> = summary.categories.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![ExpenseCategory::Installment, ExpenseCategory::Fee]);
        assert!(summary.categories.iter().all(|c| !c.amount.is_zero()));
    }

    #[test]
    fn zero_amount_records_do_not_create_entries() {
        let records = vec![record(ExpenseCategory::Iptu, "2024-01-01", 0, PaymentStatus::Paid)];
        let summary = summarize(
            &records,
            CategoryDomain::Apartment.categories(),
            FilterWindow::all_time(),
        );
        assert!(summary.categories.is_empty());
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.paid_percentage(), Decimal::ZERO);
    }

    #[test]
    fn twelve_fees_with_five_paid() {
        let records: Vec<_> = (1..=12)
            .map(|month| {
                let status = if month <= 5 {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Pending
                };
                record(ExpenseCategory::Fee, &format!("2024-{month:02}-10"), 50_000, status)
            })
            .collect();
        let summary = summarize(
            &records,
            CategoryDomain::Apartment.categories(),
            FilterWindow::all_time(),
        );
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.categories[0].amount, Decimal::new(6000, 0));
        assert_eq!(summary.paid, Decimal::new(2500, 0));
        assert_eq!(summary.pending, Decimal::new(3500, 0));
        assert_eq!(summary.total(), Decimal::new(6000, 0));
        assert_eq!(summary.paid_percentage(), Decimal::new(4167, 2));
        assert_eq!(summary.window_label, "All time");
    }

    #[test]
    fn available_years_are_distinct_and_descending() {
        let mut records = sample();
        records.retain(|r| r.date.year() != 2022);
        assert_eq!(available_years(&records), vec![2024, 2023]);
        assert!(available_years(&[]).is_empty());
    }

    #[test]
    fn category_stats_average() {
        let stats = category_stats(&sample(), ExpenseCategory::Fee);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Decimal::new(100_010, 2));
        assert_eq!(stats.average, Decimal::new(33_337, 2));
        let empty = category_stats(&sample(), ExpenseCategory::Decoration);
        assert_eq!(empty.average, Decimal::ZERO);
    }

    #[test]
    fn window_labels() {
        assert_eq!(FilterWindow::year(2024).label(), "Year 2024");
        assert_eq!(FilterWindow::month(Some(2024), 3).label(), "03/2024");
        assert_eq!(FilterWindow::month(None, 7).label(), "Month 07 (all years)");
    }
}
