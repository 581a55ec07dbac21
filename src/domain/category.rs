//! Fixed expense categories and the dashboard domains that group them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Closed set of expense types tracked by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Installment,
    Note,
    Fee,
    Furniture,
    Utilities,
    Iptu,
    EventSpace,
    Buffet,
    Photographer,
    Decoration,
    NonAlcoholicBar,
    Ceremonialist,
    Document,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 13] = [
        ExpenseCategory::Installment,
        ExpenseCategory::Note,
        ExpenseCategory::Fee,
        ExpenseCategory::Furniture,
        ExpenseCategory::Utilities,
        ExpenseCategory::Iptu,
        ExpenseCategory::EventSpace,
        ExpenseCategory::Buffet,
        ExpenseCategory::Photographer,
        ExpenseCategory::Decoration,
        ExpenseCategory::NonAlcoholicBar,
        ExpenseCategory::Ceremonialist,
        ExpenseCategory::Document,
    ];

    /// Storage/wire code, e.g. `NON_ALCOHOLIC_BAR`.
    pub fn code(&self) -> &'static str {
        match self {
            ExpenseCategory::Installment => "INSTALLMENT",
            ExpenseCategory::Note => "NOTE",
            ExpenseCategory::Fee => "FEE",
            ExpenseCategory::Furniture => "FURNITURE",
            ExpenseCategory::Utilities => "UTILITIES",
            ExpenseCategory::Iptu => "IPTU",
            ExpenseCategory::EventSpace => "EVENT_SPACE",
            ExpenseCategory::Buffet => "BUFFET",
            ExpenseCategory::Photographer => "PHOTOGRAPHER",
            ExpenseCategory::Decoration => "DECORATION",
            ExpenseCategory::NonAlcoholicBar => "NON_ALCOHOLIC_BAR",
            ExpenseCategory::Ceremonialist => "CEREMONIALIST",
            ExpenseCategory::Document => "DOCUMENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Installment => "Installments",
            ExpenseCategory::Note => "Promissory Notes",
            ExpenseCategory::Fee => "Condo Fees",
            ExpenseCategory::Furniture => "Planned Furniture",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Iptu => "IPTU",
            ExpenseCategory::EventSpace => "Event Space",
            ExpenseCategory::Buffet => "Buffet",
            ExpenseCategory::Photographer => "Photographer",
            ExpenseCategory::Decoration => "Decoration",
            ExpenseCategory::NonAlcoholicBar => "Non-alcoholic Bar",
            ExpenseCategory::Ceremonialist => "Ceremonialist",
            ExpenseCategory::Document => "Documents",
        }
    }

    /// Recurring categories carry a month reference and the `MM/YYYY - ` prefix.
    pub fn is_recurring(&self) -> bool {
        matches!(self, ExpenseCategory::Installment | ExpenseCategory::Fee)
    }

    pub fn domain(&self) -> CategoryDomain {
        match self {
            ExpenseCategory::Installment
            | ExpenseCategory::Note
            | ExpenseCategory::Fee
            | ExpenseCategory::Furniture
            | ExpenseCategory::Utilities
            | ExpenseCategory::Iptu => CategoryDomain::Apartment,
            ExpenseCategory::EventSpace
            | ExpenseCategory::Buffet
            | ExpenseCategory::Photographer
            | ExpenseCategory::Decoration
            | ExpenseCategory::NonAlcoholicBar
            | ExpenseCategory::Ceremonialist => CategoryDomain::Wedding,
            ExpenseCategory::Document => CategoryDomain::Documents,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.code() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Dashboard grouping with a fixed, declared category order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryDomain {
    Apartment,
    Wedding,
    Documents,
}

impl CategoryDomain {
    pub fn categories(&self) -> &'static [ExpenseCategory] {
        match self {
            CategoryDomain::Apartment => &[
                ExpenseCategory::Installment,
                ExpenseCategory::Note,
                ExpenseCategory::Fee,
                ExpenseCategory::Furniture,
                ExpenseCategory::Utilities,
                ExpenseCategory::Iptu,
            ],
            CategoryDomain::Wedding => &[
                ExpenseCategory::EventSpace,
                ExpenseCategory::Buffet,
                ExpenseCategory::Photographer,
                ExpenseCategory::Decoration,
                ExpenseCategory::NonAlcoholicBar,
                ExpenseCategory::Ceremonialist,
            ],
            CategoryDomain::Documents => &[ExpenseCategory::Document],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryDomain::Apartment => "Apartment",
            CategoryDomain::Wedding => "Wedding",
            CategoryDomain::Documents => "Documents",
        }
    }
}

impl FromStr for CategoryDomain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apartment" | "apt" | "condo" => Ok(CategoryDomain::Apartment),
            "wedding" => Ok(CategoryDomain::Wedding),
            "documents" | "docs" => Ok(CategoryDomain::Documents),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}
