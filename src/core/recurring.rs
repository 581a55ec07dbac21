//! Batch generation of monthly recurring charges.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    expense::{ensure_amount, recurring_description},
    DueDate, ExpenseCategory, ExpenseRecord, MonthRef, PaymentStatus, RecordId,
};
use crate::errors::ValidationError;

pub const MIN_INSTALLMENTS: u32 = 2;
pub const MAX_INSTALLMENTS: u32 = 60;
pub const MIN_DUE_DAY: u32 = 1;
pub const MAX_DUE_DAY: u32 = 31;

/// Inputs for a run of consecutive monthly charges.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    /// First billing month as typed by the user, `MM/YYYY`.
    pub start: String,
    pub count: u32,
    pub due_day: u32,
}

impl BatchRequest {
    /// Checks every input before anything is generated.
    pub fn validate(&self) -> Result<MonthRef, ValidationError> {
        if !(MIN_INSTALLMENTS..=MAX_INSTALLMENTS).contains(&self.count) {
            return Err(ValidationError::BatchCount(self.count));
        }
        if !(MIN_DUE_DAY..=MAX_DUE_DAY).contains(&self.due_day) {
            return Err(ValidationError::DueDay(self.due_day));
        }
        let start: MonthRef = self.start.trim().parse()?;
        if self.description.trim().is_empty() {
            return Err(ValidationError::Empty("description"));
        }
        ensure_amount(self.amount)?;
        Ok(start)
    }
}

/// Expands a request into `count` pending records, one per calendar month.
///
/// The due day is used verbatim: day 31 in a 30-day month is passed through.
pub fn generate_batch(
    request: &BatchRequest,
    now: DateTime<Utc>,
) -> Result<Vec<ExpenseRecord>, ValidationError> {
    let start = request.validate()?;
    let base = request.description.trim();

    (0..request.count)
        .map(|i| {
            let month_ref = start.offset(i);
            let date = DueDate::from_parts(month_ref.year(), month_ref.month(), request.due_day)?;
            Ok(ExpenseRecord {
                id: RecordId::generate(),
                category: request.category,
                description: recurring_description(&month_ref, base),
                amount: request.amount,
                date,
                month_ref: Some(month_ref),
                created_at: now,
                receipt_url: None,
                status: PaymentStatus::Pending,
            })
        })
        .collect()
}
