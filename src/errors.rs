use thiserror::Error;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmortizationError {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    /// the loan has no remaining term; callers treat it as fully amortized
    #[error("invalid loan state: {elapsed_months} months elapsed of a {term_months} month term")]
    InvalidLoanState {
        elapsed_months: u32,
        term_months: u32,
    },

    #[error("non-amortizing schedule: payment {payment} <= interest {monthly_interest}")]
    NonAmortizingSchedule {
        payment: Money,
        monthly_interest: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::Serialization {
            message: e.to_string(),
        }
    }
}

impl AmortizationError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            message: message.into(),
        }
    }

    /// whether the error only signals that nothing is left to pay
    pub fn is_fully_amortized(&self) -> bool {
        matches!(self, AmortizationError::InvalidLoanState { .. })
    }
}

pub type Result<T> = std::result::Result<T, AmortizationError>;
