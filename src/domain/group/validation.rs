//! Group validation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroupValidationError {
    #[error("Group name cannot be empty")]
    EmptyName,

    #[error("Group name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Group description exceeds maximum length of {0} characters")]
    DescriptionTooLong(usize),
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

pub fn validate_group_name(name: &str) -> Result<(), GroupValidationError> {
    if name.trim().is_empty() {
        return Err(GroupValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(GroupValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

pub fn validate_group_description(description: Option<&str>) -> Result<(), GroupValidationError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => Err(
            GroupValidationError::DescriptionTooLong(MAX_DESCRIPTION_LENGTH),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_name() {
        assert!(validate_group_name("Household").is_ok());
        assert_eq!(validate_group_name(""), Err(GroupValidationError::EmptyName));
        assert_eq!(
            validate_group_name(&"g".repeat(101)),
            Err(GroupValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_group_description() {
        assert!(validate_group_description(Some("Shared bills")).is_ok());
        assert_eq!(
            validate_group_description(Some(&"d".repeat(501))),
            Err(GroupValidationError::DescriptionTooLong(500))
        );
    }
}
