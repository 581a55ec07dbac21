use chrono::Utc;

use crate::core::expense_book::ExpenseBook;
use crate::core::recurring::{self, BatchRequest};
use crate::core::search::search_expenses;
use crate::domain::{ExpenseCategory, ExpenseDraft, ExpenseRecord, RecordId};
use crate::errors::BudgetError;
use crate::storage::Attachment;

use super::ServiceResult;

pub struct ExpenseService;

impl ExpenseService {
    pub fn create(
        book: &mut ExpenseBook,
        draft: ExpenseDraft,
        attachment: Option<Attachment>,
    ) -> ServiceResult<ExpenseRecord> {
        let record = draft.into_record()?;
        Ok(book.add(record, attachment.as_ref())?)
    }

    /// Applies the draft to an existing record. Without a new attachment the
    /// current receipt is kept.
    pub fn edit(
        book: &mut ExpenseBook,
        id: &RecordId,
        draft: ExpenseDraft,
        attachment: Option<Attachment>,
    ) -> ServiceResult<ExpenseRecord> {
        let existing = book
            .get(id)
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))?;
        let record = draft.apply_to(existing)?;
        Ok(book.update(record, attachment.as_ref())?)
    }

    /// Validates, expands and stores the whole run in one insert.
    pub fn generate_batch(
        book: &mut ExpenseBook,
        request: &BatchRequest,
    ) -> ServiceResult<Vec<ExpenseRecord>> {
        let records = recurring::generate_batch(request, Utc::now())?;
        book.add_batch(records.clone())?;
        Ok(records)
    }

    pub fn list<'a>(
        book: &'a ExpenseBook,
        category: Option<ExpenseCategory>,
        query: &str,
    ) -> Vec<&'a ExpenseRecord> {
        match category {
            Some(category) => search_expenses(book.by_category(category), query),
            None => search_expenses(book.records(), query),
        }
    }

    pub fn toggle_status(book: &mut ExpenseBook, id: &RecordId) -> ServiceResult<ExpenseRecord> {
        let status = book
            .get(id)
            .map(|record| record.status.toggled())
            .ok_or_else(|| BudgetError::NotFound(id.to_string()))?;
        Ok(book.set_status(id, status)?)
    }
}
