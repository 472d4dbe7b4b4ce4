//! Transaction domain
//!
//! Income and expense entries, the filter/sort model used to list them and
//! the repository trait backing storage.

mod entity;
mod query;
mod repository;
mod validation;

pub use entity::{NewTransaction, Transaction, TransactionId, TransactionType};
pub use query::{SortField, SortOrder, TransactionFilter, TransactionQuery};
pub use repository::TransactionRepository;
pub use validation::{validate_amount, validate_transaction_name, TransactionValidationError};

#[cfg(test)]
pub use repository::MockTransactionRepository;
