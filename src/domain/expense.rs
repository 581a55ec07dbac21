//! Expense records and the user-facing draft used to create or edit them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    category::ExpenseCategory,
    common::{Displayable, RecordId},
    period::{DueDate, MonthRef},
};
use crate::errors::ValidationError;

/// Two-valued settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

impl PaymentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Pending => "PENDING",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Pending,
            PaymentStatus::Pending => PaymentStatus::Paid,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAID" => Ok(PaymentStatus::Paid),
            "PENDING" => Ok(PaymentStatus::Pending),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub date: DueDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_ref: Option<MonthRef>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    pub status: PaymentStatus,
}

impl ExpenseRecord {
    pub fn new(
        category: ExpenseCategory,
        description: impl Into<String>,
        amount: Decimal,
        date: DueDate,
    ) -> Result<Self, ValidationError> {
        ensure_amount(amount)?;
        Ok(Self {
            id: RecordId::generate(),
            category,
            description: description.into(),
            amount,
            date,
            month_ref: None,
            created_at: Utc::now(),
            receipt_url: None,
            status: PaymentStatus::Pending,
        })
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

impl Displayable for ExpenseRecord {
    fn display_label(&self) -> String {
        format!("{} [{}] {}", self.date, self.category.label(), self.description)
    }
}

/// Prefix used by recurring categories: `"{MM/YYYY} - {description}"`.
pub fn recurring_description(month_ref: &MonthRef, description: &str) -> String {
    format!("{month_ref} - {description}")
}

/// Drops a leading `NN/NNNN - ` tag so a description carries a single month.
fn strip_month_tag(description: &str) -> &str {
    let bytes = description.as_bytes();
    let tagged = bytes.len() >= 10
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2] == b'/'
        && bytes[3..7].iter().all(u8::is_ascii_digit)
        && &bytes[7..10] == b" - ";
    if tagged {
        description[10..].trim_start()
    } else {
        description
    }
}

/// Amounts are stored in cents, so anything finer than two places is refused.
pub(crate) fn ensure_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(amount.to_string()));
    }
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::AmountPrecision(amount.to_string()));
    }
    Ok(())
}

/// Parses a user-entered amount, accepting either `.` or `,` as decimal separator.
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let cleaned = raw.trim().replace(',', ".");
    let amount =
        Decimal::from_str(&cleaned).map_err(|_| ValidationError::Amount(raw.to_string()))?;
    ensure_amount(amount)?;
    Ok(amount)
}

/// Form input for a single expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Decimal,
    pub date: DueDate,
    pub month_ref: Option<MonthRef>,
    pub status: PaymentStatus,
}

impl ExpenseDraft {
    pub fn new(
        category: ExpenseCategory,
        description: impl Into<String>,
        amount: Decimal,
        date: DueDate,
    ) -> Self {
        Self {
            category,
            description: description.into(),
            amount,
            date,
            month_ref: None,
            status: PaymentStatus::Pending,
        }
    }

    pub fn month_ref(mut self, month_ref: MonthRef) -> Self {
        self.month_ref = Some(month_ref);
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds a new record, applying the recurring naming convention.
    pub fn into_record(self) -> Result<ExpenseRecord, ValidationError> {
        let (description, month_ref) = self.normalized()?;
        let mut record = ExpenseRecord::new(self.category, description, self.amount, self.date)?;
        record.month_ref = month_ref;
        record.status = self.status;
        Ok(record)
    }

    /// Applies the draft onto an existing record, keeping id, creation time and
    /// receipt. The category may not change.
    pub fn apply_to(self, existing: &ExpenseRecord) -> Result<ExpenseRecord, ValidationError> {
        if existing.category != self.category {
            return Err(ValidationError::CategoryChange {
                from: existing.category.code().into(),
                to: self.category.code().into(),
            });
        }
        ensure_amount(self.amount)?;
        let (description, month_ref) = self.normalized()?;
        Ok(ExpenseRecord {
            id: existing.id.clone(),
            category: existing.category,
            description,
            amount: self.amount,
            date: self.date,
            month_ref,
            created_at: existing.created_at,
            receipt_url: existing.receipt_url.clone(),
            status: self.status,
        })
    }

    fn normalized(&self) -> Result<(String, Option<MonthRef>), ValidationError> {
        let base = self.description.trim();
        if base.is_empty() {
            return Err(ValidationError::Empty("description"));
        }
        if !self.category.is_recurring() {
            return Ok((base.to_string(), None));
        }
        let month_ref = self
            .month_ref
            .ok_or_else(|| ValidationError::MissingMonthReference(self.category.code().into()))?;
        let base = strip_month_tag(base);
        if base.is_empty() {
            return Err(ValidationError::Empty("description"));
        }
        Ok((recurring_description(&month_ref, base), Some(month_ref)))
    }
}
