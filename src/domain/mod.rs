//! Domain layer - Core business logic and entities

pub mod analytics;
pub mod category;
pub mod error;
pub mod export;
pub mod group;
pub mod transaction;
pub mod user;

pub use analytics::{Granularity, Period};
pub use category::{Category, CategoryId, CategoryRepository, NewCategory};
pub use error::DomainError;
pub use export::{ExportFormat, ExportRow, Exporter};
pub use group::{Group, GroupId, GroupRepository, NewGroup};
pub use transaction::{
    NewTransaction, SortField, SortOrder, Transaction, TransactionFilter, TransactionId,
    TransactionQuery, TransactionRepository, TransactionType,
};
pub use user::{NewUser, User, UserId, UserRepository};

/// Convert module validation errors into domain validation errors
macro_rules! impl_validation_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for DomainError {
                fn from(err: $error) -> Self {
                    DomainError::validation(err.to_string())
                }
            }
        )*
    };
}

impl_validation_error!(
    user::UserValidationError,
    category::CategoryValidationError,
    transaction::TransactionValidationError,
    group::GroupValidationError,
);
