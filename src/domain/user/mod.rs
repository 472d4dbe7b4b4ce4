//! User domain
//!
//! Account entities, validation rules and the repository trait used for
//! registration and authentication.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    normalize_email, validate_email, validate_name, validate_password, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
