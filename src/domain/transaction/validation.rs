//! Transaction validation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransactionValidationError {
    #[error("Transaction name cannot be empty")]
    EmptyName,

    #[error("Transaction name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount must be a finite number")]
    NonFiniteAmount,
}

const MAX_NAME_LENGTH: usize = 100;

pub fn validate_transaction_name(name: &str) -> Result<(), TransactionValidationError> {
    if name.trim().is_empty() {
        return Err(TransactionValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TransactionValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), TransactionValidationError> {
    if !amount.is_finite() {
        return Err(TransactionValidationError::NonFiniteAmount);
    }

    if amount <= 0.0 {
        return Err(TransactionValidationError::NonPositiveAmount);
    }

    Ok(())
}
