//! Category validation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CategoryValidationError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Category description exceeds maximum length of {0} characters")]
    DescriptionTooLong(usize),
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

pub fn validate_category_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CategoryValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

pub fn validate_category_description(
    description: Option<&str>,
) -> Result<(), CategoryValidationError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => Err(
            CategoryValidationError::DescriptionTooLong(MAX_DESCRIPTION_LENGTH),
        ),
        _ => Ok(()),
    }
}
