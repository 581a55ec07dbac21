//! Billing-period tags (`MM/YYYY`) and stored due dates (`YYYY-MM-DD`).

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ValidationError;

/// Month-reference tag marking which billing period a recurring record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    pub fn new(month: u32, year: i32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(ValidationError::MonthReference(format!("{month:02}/{year}")));
        }
        Ok(Self { year, month })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Rolls forward `months` calendar months, carrying into the year.
    pub fn offset(&self, months: u32) -> Self {
        let index = self.month - 1 + months;
        Self {
            month: index % 12 + 1,
            year: self.year + (index / 12) as i32,
        }
    }
}

impl FromStr for MonthRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::MonthReference(s.to_string());
        let (month, year) = s.split_once('/').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 4 || !all_digits(month) || !all_digits(year) {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        MonthRef::new(month, year).map_err(|_| invalid())
    }
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl Serialize for MonthRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Stored due/record date.
///
/// The shape is checked but the day is not validated against the month, so a
/// generated `2024-02-31` survives unchanged. Year and month come from the
/// leading `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DueDate(String);

impl DueDate {
    pub fn from_parts(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        format!("{year:04}-{month:02}-{day:02}").parse()
    }

    pub fn year(&self) -> i32 {
        self.0[0..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[5..7].parse().unwrap_or_default()
    }

    pub fn day(&self) -> u32 {
        self.0[8..10].parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar date, when the stored day exists in its month.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl From<NaiveDate> for DueDate {
    fn from(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }
}

impl FromStr for DueDate {
    type Err = ValidationError;

    /// Accepts `YYYY-MM-DD`, and also a full ISO timestamp whose leading ten
    /// characters have that shape.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::Date(s.to_string());
        let head = s.get(0..10).ok_or_else(invalid)?;
        if s.len() > 10 && !s[10..].starts_with('T') && !s[10..].starts_with(' ') {
            return Err(invalid());
        }
        let bytes = head.as_bytes();
        if bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(invalid());
        }
        let (year, month, day) = (&head[0..4], &head[5..7], &head[8..10]);
        if !all_digits(year) || !all_digits(month) || !all_digits(day) {
            return Err(invalid());
        }
        let month_value: u32 = month.parse().map_err(|_| invalid())?;
        let day_value: u32 = day.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month_value) || !(1..=31).contains(&day_value) {
            return Err(invalid());
        }
        Ok(Self(head.to_string()))
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
