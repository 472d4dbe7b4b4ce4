//! Category domain

mod entity;
mod repository;
mod validation;

pub use entity::{Category, CategoryId, NewCategory};
pub use repository::CategoryRepository;
pub use validation::{
    validate_category_description, validate_category_name, CategoryValidationError,
};

#[cfg(test)]
pub use repository::MockCategoryRepository;
