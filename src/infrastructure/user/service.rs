//! User service for registration, authentication and profile management

use std::sync::Arc;
use tracing::info;

use crate::domain::user::{
    normalize_email, validate_email, validate_name, validate_password, NewUser, User, UserId,
    UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Partial profile update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();
        let email = normalize_email(&request.email);

        validate_name("First name", &first_name)?;
        validate_name("Last name", &last_name)?;
        validate_email(&email)?;
        validate_password(&request.password)?;

        if self.repository.get_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("Email already registered"));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self
            .repository
            .create(NewUser {
                first_name,
                last_name,
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id(), "User registered");
        Ok(user)
    }

    /// `Ok(None)` for an unknown email or a wrong password.
    /// Inactive accounts with valid credentials are rejected with a validation error.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = match self.repository.get_by_email(&normalize_email(email)).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        if !user.is_active() {
            return Err(DomainError::validation("Inactive user"));
        }

        Ok(Some(user))
    }

    pub async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_email(&normalize_email(email)).await
    }

    pub async fn require(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User {} not found", id)))
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    pub async fn change_password(
        &self,
        id: UserId,
        request: ChangePasswordRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        if !self.hasher.verify(&request.current_password, user.password_hash()) {
            return Err(DomainError::validation("Current password is incorrect"));
        }

        validate_password(&request.new_password)?;

        user.set_password_hash(self.hasher.hash(&request.new_password)?);
        let user = self.repository.update(&user).await?;

        info!(user_id = %id, "Password changed");
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        if let Some(first_name) = request.first_name {
            let first_name = first_name.trim();
            validate_name("First name", first_name)?;
            user.set_first_name(first_name);
        }

        if let Some(last_name) = request.last_name {
            let last_name = last_name.trim();
            validate_name("Last name", last_name)?;
            user.set_last_name(last_name);
        }

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            validate_email(&email)?;

            if email != user.email() {
                if self.repository.get_by_email(&email).await?.is_some() {
                    return Err(DomainError::conflict("Email already registered"));
                }
                user.set_email(email);
            }
        }

        self.repository.update(&user).await
    }
}
