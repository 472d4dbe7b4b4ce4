//! Category service

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::category::{
    validate_category_description, validate_category_name, Category, CategoryId,
    CategoryRepository, NewCategory,
};
use crate::domain::transaction::{TransactionFilter, TransactionRepository, TransactionType};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: TransactionType,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub kind: Option<TransactionType>,
}

pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    transactions: Arc<dyn TransactionRepository>,
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::conflict(format!("Category with name '{}' already exists", name))
}

fn not_found() -> DomainError {
    DomainError::not_found("Category not found")
}

impl CategoryService {
    pub fn new(
        repository: Arc<dyn CategoryRepository>,
        transactions: Arc<dyn TransactionRepository>,
    ) -> Self {
        Self {
            repository,
            transactions,
        }
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> Result<Category, DomainError> {
        let name = request.name.trim().to_string();
        validate_category_name(&name)?;
        validate_category_description(request.description.as_deref())?;

        if self.repository.get_by_name(&name).await?.is_some() {
            return Err(duplicate_name(&name));
        }

        let category = self
            .repository
            .create(NewCategory {
                name,
                description: request.description,
                kind: request.kind,
            })
            .await?;

        info!(category_id = %category.id(), name = %category.name(), "Category created");
        Ok(category)
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        self.repository.list().await
    }

    pub async fn get(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.repository.get(id).await?.ok_or_else(not_found)
    }

    /// All categories keyed by id, for report rendering
    pub async fn lookup(&self) -> Result<HashMap<CategoryId, Category>, DomainError> {
        Ok(self
            .repository
            .list()
            .await?
            .into_iter()
            .map(|c| (c.id(), c))
            .collect())
    }

    pub async fn update(
        &self,
        id: CategoryId,
        request: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let mut category = self.get(id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            validate_category_name(&name)?;

            if name != category.name() {
                if let Some(existing) = self.repository.get_by_name(&name).await? {
                    if existing.id() != id {
                        return Err(duplicate_name(&name));
                    }
                }
                category.set_name(name);
            }
        }

        if let Some(description) = request.description {
            validate_category_description(description.as_deref())?;
            category.set_description(description);
        }

        if let Some(kind) = request.kind {
            category.set_kind(kind);
        }

        self.repository.update(&category).await
    }

    /// Categories still referenced by transactions cannot be deleted
    pub async fn delete(&self, id: CategoryId) -> Result<(), DomainError> {
        self.get(id).await?;

        let filter = TransactionFilter::default().with_category(Some(id));
        let in_use = self.transactions.count(&filter).await?;
        if in_use > 0 {
            return Err(DomainError::conflict(format!(
                "Category is used by {} transaction(s) and cannot be deleted",
                in_use
            )));
        }

        if !self.repository.delete(id).await? {
            return Err(not_found());
        }

        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::MockTransactionRepository;
    use crate::infrastructure::category::InMemoryCategoryRepository;

    fn create_service(in_use: usize) -> CategoryService {
        let mut transactions = MockTransactionRepository::new();
        transactions.expect_count().returning(move |_| Ok(in_use));
        CategoryService::new(
            Arc::new(InMemoryCategoryRepository::new()),
            Arc::new(transactions),
        )
    }

    fn request(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            description: Some("Everyday spending".to_string()),
            kind: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = create_service(0);
        let created = service.create(request("  Groceries ")).await.unwrap();

        assert_eq!(created.name(), "Groceries");
        let fetched = service.get(created.id()).await.unwrap();
        assert_eq!(fetched.description(), Some("Everyday spending"));
    }

    #[tokio::test]
    async fn test_duplicate_name_message() {
        let service = create_service(0);
        service.create(request("Groceries")).await.unwrap();

        let err = service.create(request("Groceries")).await.unwrap_err();
        assert_eq!(err.message(), "Category with name 'Groceries' already exists");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let service = create_service(0);
        let created = service.create(request("Groceries")).await.unwrap();

        let updated = service
            .update(
                created.id(),
                UpdateCategoryRequest {
                    description: Some(None),
                    kind: Some(TransactionType::Income),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), "Groceries");
        assert_eq!(updated.description(), None);
        assert_eq!(updated.kind(), TransactionType::Income);
    }

    #[tokio::test]
    async fn test_update_to_existing_name() {
        let service = create_service(0);
        service.create(request("Groceries")).await.unwrap();
        let travel = service.create(request("Travel")).await.unwrap();

        let err = service
            .update(
                travel.id(),
                UpdateCategoryRequest {
                    name: Some("Groceries".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let service = create_service(0);
        let err = service.get(CategoryId::new(99)).await.unwrap_err();
        assert_eq!(err.message(), "Category not found");
    }

    #[tokio::test]
    async fn test_delete() {
        let service = create_service(0);
        let created = service.create(request("Groceries")).await.unwrap();

        service.delete(created.id()).await.unwrap();
        assert!(service.get(created.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_in_use() {
        let service = create_service(3);
        let created = service.create(request("Groceries")).await.unwrap();

        let err = service.delete(created.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }
}
