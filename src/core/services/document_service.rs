use chrono::Local;
use rust_decimal::Decimal;

use crate::core::expense_book::ExpenseBook;
use crate::domain::{DueDate, ExpenseCategory, ExpenseRecord, PaymentStatus};
use crate::errors::ValidationError;
use crate::storage::Attachment;

use super::{ServiceError, ServiceResult};

/// Outcome of a multi-file upload.
#[derive(Debug)]
pub struct DocumentReport {
    pub created: Vec<ExpenseRecord>,
    /// Title and error of the item that stopped the run.
    pub failed: Option<(String, ServiceError)>,
    /// Items never attempted because an earlier one failed.
    pub skipped: usize,
}

impl DocumentReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

pub struct DocumentService;

impl DocumentService {
    /// Stores a file as a DOCUMENT record: no value, always settled, dated today.
    pub fn add(
        book: &mut ExpenseBook,
        title: &str,
        attachment: Option<Attachment>,
    ) -> ServiceResult<ExpenseRecord> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty("title").into());
        }
        let attachment = attachment.ok_or(ValidationError::MissingAttachment)?;
        let today = DueDate::from(Local::now().date_naive());
        let record = ExpenseRecord::new(ExpenseCategory::Document, title, Decimal::ZERO, today)?
            .with_status(PaymentStatus::Paid);
        Ok(book.add(record, Some(&attachment))?)
    }

    /// Uploads one item at a time and stops at the first failure. Items that
    /// were already stored stay stored.
    pub fn add_many(
        book: &mut ExpenseBook,
        items: Vec<(String, Attachment)>,
    ) -> DocumentReport {
        let total = items.len();
        let mut created = Vec::with_capacity(total);
        for (title, attachment) in items {
            match Self::add(book, &title, Some(attachment)) {
                Ok(record) => created.push(record),
                Err(err) => {
                    tracing::warn!(title = %title, error = %err, "document upload stopped");
                    let skipped = total - created.len() - 1;
                    return DocumentReport {
                        created,
                        failed: Some((title, err)),
                        skipped,
                    };
                }
            }
        }
        DocumentReport {
            created,
            failed: None,
            skipped: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json_backend::JsonStorage;
    use tempfile::TempDir;

    fn book() -> (ExpenseBook, TempDir) {
        let temp = TempDir::new().unwrap();
        let storage = JsonStorage::new(temp.path()).unwrap();
        (
            ExpenseBook::new(Box::new(storage.clone()), Box::new(storage)),
            temp,
        )
    }

    #[test]
    fn documents_are_paid_and_worth_nothing() {
        let (mut book, _guard) = book();
        let record = DocumentService::add(
            &mut book,
            "  Certidao de casamento ",
            Some(Attachment::new("certidao.pdf", b"%PDF".to_vec())),
        )
        .unwrap();
        assert_eq!(record.category, ExpenseCategory::Document);
        assert_eq!(record.description, "Certidao de casamento");
        assert_eq!(record.amount, Decimal::ZERO);
        assert!(record.is_paid());
        assert!(record.receipt_url.is_some());
    }

    #[test]
    fn title_and_file_are_required() {
        let (mut book, _guard) = book();
        let err = DocumentService::add(&mut book, " ", Some(Attachment::new("a.pdf", vec![])))
            .unwrap_err();
        assert!(err.is_validation());
        let err = DocumentService::add(&mut book, "RG", None).unwrap_err();
        assert!(err.is_validation());
        assert!(book.records().is_empty());
    }

    #[test]
    fn add_many_stops_at_first_failure_without_rollback() {
        let (mut book, _guard) = book();
        let items = vec![
            ("RG".to_string(), Attachment::new("rg.png", vec![1])),
            ("".to_string(), Attachment::new("blank.png", vec![2])),
            ("CPF".to_string(), Attachment::new("cpf.png", vec![3])),
        ];
        let report = DocumentService::add_many(&mut book, items);
        assert_eq!(report.created.len(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.skipped, 1);
        assert_eq!(book.records().len(), 1);
    }

    #[test]
    fn add_many_reports_full_success() {
        let (mut book, _guard) = book();
        let items = vec![
            ("RG".to_string(), Attachment::new("rg.png", vec![1])),
            ("CPF".to_string(), Attachment::new("cpf.png", vec![3])),
        ];
        let report = DocumentService::add_many(&mut book, items);
        assert!(report.is_complete());
        assert_eq!(report.created.len(), 2);
    }
}
