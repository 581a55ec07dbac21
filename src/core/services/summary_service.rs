use crate::core::aggregation::{self, CategoryStats, DashboardSummary, FilterWindow};
use crate::core::expense_book::ExpenseBook;
use crate::domain::{CategoryDomain, ExpenseCategory};

pub struct SummaryService;

impl SummaryService {
    pub fn dashboard(
        book: &ExpenseBook,
        domain: CategoryDomain,
        window: FilterWindow,
    ) -> DashboardSummary {
        aggregation::summarize(book.records(), domain.categories(), window)
    }

    pub fn available_years(book: &ExpenseBook) -> Vec<i32> {
        aggregation::available_years(book.records())
    }

    pub fn category_stats(book: &ExpenseBook, category: ExpenseCategory) -> CategoryStats {
        aggregation::category_stats(book.records(), category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExpenseRecord, PaymentStatus};
    use crate::storage::json_backend::JsonStorage;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn seeded_book(temp: &TempDir) -> ExpenseBook {
        let storage = JsonStorage::new(temp.path()).unwrap();
        let mut book = ExpenseBook::new(Box::new(storage.clone()), Box::new(storage));
        let entries = [
            (ExpenseCategory::Fee, "2024-03-10", 500, PaymentStatus::Paid),
            (ExpenseCategory::Iptu, "2023-03-10", 300, PaymentStatus::Pending),
            (ExpenseCategory::Buffet, "2024-03-20", 9000, PaymentStatus::Pending),
        ];
        for (category, date, amount, status) in entries {
            let record =
                ExpenseRecord::new(category, "x", Decimal::new(amount, 0), date.parse().unwrap())
                    .unwrap()
                    .with_status(status);
            book.add(record, None).unwrap();
        }
        book
    }

    #[test]
    fn dashboards_are_scoped_to_their_domain() {
        let temp = TempDir::new().unwrap();
        let book = seeded_book(&temp);

        let apartment =
            SummaryService::dashboard(&book, CategoryDomain::Apartment, FilterWindow::all_time());
        assert_eq!(apartment.total(), Decimal::new(800, 0));
        assert_eq!(apartment.paid, Decimal::new(500, 0));

        let wedding =
            SummaryService::dashboard(&book, CategoryDomain::Wedding, FilterWindow::year(2024));
        assert_eq!(wedding.total(), Decimal::new(9000, 0));
        assert_eq!(wedding.categories.len(), 1);
    }

    #[test]
    fn years_and_stats_read_the_cache() {
        let temp = TempDir::new().unwrap();
        let book = seeded_book(&temp);
        assert_eq!(SummaryService::available_years(&book), vec![2024, 2023]);
        let stats = SummaryService::category_stats(&book, ExpenseCategory::Buffet);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total, Decimal::new(9000, 0));
    }
}
