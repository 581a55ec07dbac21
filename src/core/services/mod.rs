pub mod document_service;
pub mod expense_service;
pub mod summary_service;

pub use document_service::{DocumentReport, DocumentService};
pub use expense_service::ExpenseService;
pub use summary_service::SummaryService;

use crate::errors::{BudgetError, Diagnosis, ValidationError};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("{0}")]
    Invalid(String),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Budget(BudgetError::Validation(err))
    }
}

impl ServiceError {
    pub fn diagnosis(&self) -> Diagnosis {
        match self {
            ServiceError::Budget(err) => err.diagnosis(),
            ServiceError::Invalid(_) => Diagnosis::Generic,
        }
    }

    /// True when the failure was caught before anything was sent to a store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Invalid(_) | ServiceError::Budget(BudgetError::Validation(_))
        )
    }
}
