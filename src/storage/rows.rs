//! Table row shapes and the mapping between storage and domain field names.
//!
//! Rows mirror the backend tables field for field. Fields the backend might
//! omit are optional here so that a missing value becomes a mapping error
//! instead of a silent default.

use chrono::{DateTime, Utc};
use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DueDate, ExpenseCategory, ExpenseRecord, GuestRecord, GuestSide, MonthRef, NewGuest,
    PaymentStatus, RecordId,
};
use crate::errors::{BudgetError, Result};

pub const EXPENSES_TABLE: &str = "expenses";
pub const GUESTS_TABLE: &str = "guests";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub month_year: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub is_child: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<&ExpenseRecord> for ExpenseRow {
    fn from(record: &ExpenseRecord) -> Self {
        Self {
            id: Some(serde_json::Value::String(record.id.to_string())),
            kind: Some(record.category.code().to_string()),
            description: Some(record.description.clone()),
            amount: record.amount.to_f64(),
            date: Some(record.date.to_string()),
            month_year: record.month_ref.map(|m| m.to_string()),
            created_at: Some(record.created_at.to_rfc3339()),
            receipt_url: record.receipt_url.clone(),
            status: Some(record.status.code().to_string()),
        }
    }
}

impl TryFrom<ExpenseRow> for ExpenseRecord {
    type Error = BudgetError;

    fn try_from(row: ExpenseRow) -> Result<Self> {
        const T: &str = EXPENSES_TABLE;
        let id = map_id(T, row.id)?;
        let category = required(T, "type", row.kind)?
            .parse::<ExpenseCategory>()
            .map_err(|e| BudgetError::mapping(T, "type", e.to_string()))?;
        let description = required(T, "description", row.description)?;
        let raw_amount = required(T, "amount", row.amount)?;
        let amount = Decimal::from_f64(raw_amount)
            .map(|value| value.round_dp(2))
            .ok_or_else(|| {
                BudgetError::mapping(T, "amount", format!("is not finite ({raw_amount})"))
            })?;
        if amount < Decimal::ZERO {
            return Err(BudgetError::mapping(T, "amount", format!("is negative ({amount})")));
        }
        let date = required(T, "date", row.date)?
            .parse::<DueDate>()
            .map_err(|e| BudgetError::mapping(T, "date", e.to_string()))?;
        let month_ref = row
            .month_year
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| raw.parse::<MonthRef>())
            .transpose()
            .map_err(|e| BudgetError::mapping(T, "month_year", e.to_string()))?;
        let created_at = map_timestamp(T, row.created_at)?;
        let status = required(T, "status", row.status)?
            .parse::<PaymentStatus>()
            .map_err(|e| BudgetError::mapping(T, "status", e))?;

        Ok(ExpenseRecord {
            id,
            category,
            description,
            amount,
            date,
            month_ref,
            created_at,
            receipt_url: row.receipt_url.filter(|url| !url.is_empty()),
            status,
        })
    }
}

impl From<&GuestRecord> for GuestRow {
    fn from(guest: &GuestRecord) -> Self {
        Self {
            id: Some(serde_json::Value::String(guest.id.to_string())),
            name: Some(guest.name.clone()),
            side: Some(guest.side.code().to_string()),
            is_child: Some(guest.is_child),
            created_at: Some(guest.created_at.to_rfc3339()),
        }
    }
}

impl GuestRow {
    /// Insert payload; the store assigns the id.
    pub fn for_insert(guest: &NewGuest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: Some(guest.name.clone()),
            side: Some(guest.side.code().to_string()),
            is_child: Some(guest.is_child),
            created_at: Some(created_at.to_rfc3339()),
        }
    }
}

impl TryFrom<GuestRow> for GuestRecord {
    type Error = BudgetError;

    fn try_from(row: GuestRow) -> Result<Self> {
        const T: &str = GUESTS_TABLE;
        let id = map_id(T, row.id)?;
        let name = required(T, "name", row.name)?;
        let side = required(T, "side", row.side)?
            .parse::<GuestSide>()
            .map_err(|e| BudgetError::mapping(T, "side", e.to_string()))?;
        let created_at = map_timestamp(T, row.created_at)?;
        Ok(GuestRecord {
            id,
            name,
            side,
            is_child: row.is_child.unwrap_or(false),
            created_at,
        })
    }
}

fn required<V>(table: &'static str, field: &'static str, value: Option<V>) -> Result<V> {
    value.ok_or_else(|| BudgetError::mapping(table, field, "is missing"))
}

/// Ids may come back as strings (uuid) or integers (serial columns).
fn map_id(table: &'static str, value: Option<serde_json::Value>) -> Result<RecordId> {
    match required(table, "id", value)? {
        serde_json::Value::String(s) if !s.is_empty() => Ok(RecordId::new(s)),
        serde_json::Value::Number(n) => Ok(RecordId::new(n.to_string())),
        other => Err(BudgetError::mapping(
            table,
            "id",
            format!("has unexpected value {other}"),
        )),
    }
}

fn map_timestamp(table: &'static str, value: Option<String>) -> Result<DateTime<Utc>> {
    let raw = required(table, "created_at", value)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // PostgREST renders timestamptz with a space and short offset.
            DateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f%#z")
                .map(|dt| dt.with_timezone(&Utc))
        })
        .map_err(|e| BudgetError::mapping(table, "created_at", format!("`{raw}`: {e}")))
}

pub fn records_from_rows(rows: Vec<ExpenseRow>) -> Result<Vec<ExpenseRecord>> {
    rows.into_iter().map(ExpenseRecord::try_from).collect()
}

pub fn guests_from_rows(rows: Vec<GuestRow>) -> Result<Vec<GuestRecord>> {
    rows.into_iter().map(GuestRecord::try_from).collect()
}
