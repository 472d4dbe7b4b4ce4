//! PostgreSQL category repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::category::{Category, CategoryId, CategoryRepository, NewCategory};
use crate::domain::DomainError;
use crate::infrastructure::storage::{is_unique_violation, storage_error};

const CATEGORY_COLUMNS: &str = "id, name, description, type, created_at";

#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_name(name: &str) -> DomainError {
    DomainError::conflict(format!("Category with name '{}' already exists", name))
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn get(&self, id: CategoryId) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get category", e))?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get category by name", e))?;

        row.as_ref().map(row_to_category).transpose()
    }

    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list categories", e))?;

        rows.iter().map(row_to_category).collect()
    }

    async fn create(&self, category: NewCategory) -> Result<Category, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO categories (name, description, type)
            VALUES ($1, $2, $3)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name(&category.name)
            } else {
                storage_error("Failed to create category", e)
            }
        })?;

        row_to_category(&row)
    }

    async fn update(&self, category: &Category) -> Result<Category, DomainError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, description = $3, type = $4 WHERE id = $1",
        )
        .bind(category.id().value())
        .bind(category.name())
        .bind(category.description())
        .bind(category.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_name(category.name())
            } else {
                storage_error("Failed to update category", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Category not found"));
        }

        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete category", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_category(row: &PgRow) -> Result<Category, DomainError> {
    let read = |e: sqlx::Error| storage_error("Failed to decode category row", e);
    let kind: String = row.try_get("type").map_err(read)?;

    Ok(Category::restore(
        CategoryId::new(row.try_get("id").map_err(read)?),
        row.try_get("name").map_err(read)?,
        row.try_get("description").map_err(read)?,
        kind.parse()?,
        row.try_get("created_at").map_err(read)?,
    ))
}
