use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, RecordId};
use crate::errors::ValidationError;

/// Which family a guest is invited by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestSide {
    Bride,
    Groom,
}

impl GuestSide {
    pub fn code(&self) -> &'static str {
        match self {
            GuestSide::Bride => "BRIDE",
            GuestSide::Groom => "GROOM",
        }
    }
}

impl fmt::Display for GuestSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GuestSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRIDE" => Ok(GuestSide::Bride),
            "GROOM" => Ok(GuestSide::Groom),
            _ => Err(ValidationError::UnknownSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub id: RecordId,
    pub name: String,
    pub side: GuestSide,
    #[serde(default)]
    pub is_child: bool,
    pub created_at: DateTime<Utc>,
}

impl Displayable for GuestRecord {
    fn display_label(&self) -> String {
        if self.is_child {
            format!("{} ({}, child)", self.name, self.side)
        } else {
            format!("{} ({})", self.name, self.side)
        }
    }
}

/// Guest input before the store assigns identity and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub name: String,
    pub side: GuestSide,
    pub is_child: bool,
}

impl NewGuest {
    pub fn new(name: impl AsRef<str>, side: GuestSide) -> Result<Self, ValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValidationError::Empty("guest name"));
        }
        Ok(Self {
            name: name.to_string(),
            side,
            is_child: false,
        })
    }

    pub fn child(mut self, is_child: bool) -> Self {
        self.is_child = is_child;
        self
    }
}
