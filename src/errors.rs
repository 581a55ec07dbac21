use thiserror::Error;

/// Input problems detected before any request leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid month reference `{0}`; expected MM/YYYY")]
    MonthReference(String),
    #[error("invalid date `{0}`; expected YYYY-MM-DD")]
    Date(String),
    #[error("installment count {0} is outside 2..=60")]
    BatchCount(u32),
    #[error("due day {0} is outside 1..=31")]
    DueDay(u32),
    #[error("amount must not be negative (got {0})")]
    NegativeAmount(String),
    #[error("invalid amount `{0}`")]
    Amount(String),
    #[error("amount {0} has more than 2 decimal places")]
    AmountPrecision(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("category {0} requires a month reference")]
    MissingMonthReference(String),
    #[error("category cannot change from {from} to {to}")]
    CategoryChange { from: String, to: String },
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("unknown guest side `{0}`")]
    UnknownSide(String),
    #[error("a file is required")]
    MissingAttachment,
}

/// Error type shared by the stores, the in-memory books and the services.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed `{table}` row: field `{field}` {reason}")]
    Mapping {
        table: &'static str,
        field: &'static str,
        reason: String,
    },
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BudgetError {
    fn from(err: reqwest::Error) -> Self {
        BudgetError::Network(err.to_string())
    }
}

impl BudgetError {
    pub(crate) fn mapping(table: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        BudgetError::Mapping {
            table,
            field,
            reason: reason.into(),
        }
    }

    /// Classifies the failure into a user-facing diagnosis.
    pub fn diagnosis(&self) -> Diagnosis {
        let text = self.to_string().to_lowercase();
        if text.contains("bucket not found") || text.contains("bucket_not_found") {
            Diagnosis::MissingBucket
        } else if text.contains("row-level security")
            || text.contains("row level security")
            || (text.contains("violates") && text.contains("policy"))
            || text.contains("permission denied")
        {
            Diagnosis::PolicyDenied
        } else {
            Diagnosis::Generic
        }
    }
}

/// Outcome of matching a failure against known backend misconfigurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    MissingBucket,
    PolicyDenied,
    Generic,
}

impl Diagnosis {
    pub fn message(&self) -> &'static str {
        match self {
            Diagnosis::MissingBucket => {
                "The storage bucket \"receipts\" does not exist. Create a public bucket named \
                 \"receipts\" in the backend storage settings and try again."
            }
            Diagnosis::PolicyDenied => {
                "The backend refused the request because of an access policy. Add insert/select \
                 policies for the \"expenses\" and \"guests\" tables and an upload policy for the \
                 \"receipts\" bucket, then try again."
            }
            Diagnosis::Generic => "The operation failed. Check the logs for details.",
        }
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bucket_is_recognised() {
        let err = BudgetError::Backend {
            status: 400,
            message: r#"{"statusCode":"404","error":"Bucket not found"}"#.into(),
        };
        assert_eq!(err.diagnosis(), Diagnosis::MissingBucket);
        assert!(err.diagnosis().message().contains("receipts"));
    }

    #[test]
    fn policy_denial_is_recognised() {
        let err = BudgetError::Backend {
            status: 403,
            message: "new row violates row-level security policy for table \"expenses\"".into(),
        };
        assert_eq!(err.diagnosis(), Diagnosis::PolicyDenied);
    }

    #[test]
    fn other_failures_fall_back_to_generic() {
        let err = BudgetError::Network("connection refused".into());
        assert_eq!(err.diagnosis(), Diagnosis::Generic);
        let err = BudgetError::from(ValidationError::DueDay(40));
        assert_eq!(err.diagnosis(), Diagnosis::Generic);
    }
}
