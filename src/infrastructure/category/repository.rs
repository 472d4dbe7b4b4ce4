//! In-memory category repository

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::category::{Category, CategoryId, CategoryRepository, NewCategory};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    categories: BTreeMap<CategoryId, Category>,
}

#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    state: RwLock<State>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::conflict(format!("Category with name '{}' already exists", name))
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, DomainError> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.name() == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(categories)
    }

    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut state = self.state.write().await;

        if state.categories.values().any(|c| c.name() == category.name) {
            return Err(duplicate_name(&category.name));
        }

        state.last_id += 1;
        let category = Category::from_new(CategoryId::new(state.last_id), category);
        state.categories.insert(category.id(), category.clone());

        Ok(category)
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        let mut state = self.state.write().await;

        if !state.categories.contains_key(&category.id()) {
            return Err(DomainError::not_found("Category not found"));
        }

        let name_taken = state
            .categories
            .values()
            .any(|c| c.name() == category.name() && c.id() != category.id());

        if name_taken {
            return Err(duplicate_name(category.name()));
        }

        state.categories.insert(category.id(), category.clone());
        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, DomainError> {
        Ok(self.state.write().await.categories.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionType;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
            kind: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_name() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(new_category("Travel")).await.unwrap();
        repo.create(new_category("Food")).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Food", "Travel"]);
    }

    #[tokio::test]
    async fn test_unique_names() {
        let repo = InMemoryCategoryRepository::new();
        repo.create(new_category("Food")).await.unwrap();
        let mut travel = repo.create(new_category("Travel")).await.unwrap();

        assert!(matches!(
            repo.create(new_category("Food")).await,
            Err(DomainError::Conflict { .. })
        ));

        travel.set_name("Food");
        assert!(matches!(
            repo.update(&travel).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryCategoryRepository::new();
        let food = repo.create(new_category("Food")).await.unwrap();

        assert!(repo.delete(food.id()).await.unwrap());
        assert!(!repo.delete(food.id()).await.unwrap());
        assert!(repo.get_by_name("Food").await.unwrap().is_none());
    }
}
