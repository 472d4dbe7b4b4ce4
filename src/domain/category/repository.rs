//! Category repository trait

use async_trait::async_trait;

use super::entity::{Category, CategoryId, NewCategory};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, DomainError>;

    /// Exact, case-sensitive name lookup
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;

    /// All categories ordered by name
    async fn list(&self) -> Result<Vec<Category>, DomainError>;

    async fn create(&self, category: NewCategory) -> Result<Category, DomainError>;

    async fn update(&self, category: &Category) -> Result<Category, DomainError>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: CategoryId) -> Result<bool, DomainError>;
}
