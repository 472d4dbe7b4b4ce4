//! Group domain
//!
//! Groups let several users record transactions into a shared ledger.

mod entity;
mod repository;
mod validation;

pub use entity::{Group, GroupId, NewGroup};
pub use repository::GroupRepository;
pub use validation::{validate_group_description, validate_group_name, GroupValidationError};

#[cfg(test)]
pub use repository::MockGroupRepository;
