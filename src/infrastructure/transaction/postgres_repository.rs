//! PostgreSQL transaction repository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::domain::category::CategoryId;
use crate::domain::group::GroupId;
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionQuery,
    TransactionRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{storage_error, to_bind};

const TRANSACTION_COLUMNS: &str =
    "id, name, type, category_id, amount, date, user_id, group_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so the needle matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Append `WHERE` conditions for every set filter field
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    builder.push(" WHERE TRUE");

    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id.value());
    }
    if let Some(group_id) = filter.group_id {
        builder.push(" AND group_id = ").push_bind(group_id.value());
    }
    if let Some(category_id) = filter.category_id {
        builder.push(" AND category_id = ").push_bind(category_id.value());
    }
    if let Some(kind) = filter.kind {
        builder.push(" AND type = ").push_bind(kind.as_str());
    }
    if let Some(from) = filter.from {
        builder.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND date <= ").push_bind(to);
    }
    if let Some(cutoff) = filter.before {
        builder.push(" AND date < ").push_bind(cutoff);
    }
    if let Some(needle) = &filter.name_contains {
        builder
            .push(" AND name ILIKE ")
            .push_bind(like_pattern(needle));
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to get transaction", e))?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn create(&self, transaction: NewTransaction) -> Result<Transaction, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO transactions (name, type, category_id, amount, date, user_id, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(&transaction.name)
        .bind(transaction.kind.as_str())
        .bind(transaction.category_id.value())
        .bind(transaction.amount)
        .bind(transaction.date)
        .bind(transaction.user_id.value())
        .bind(transaction.group_id.map(|g| g.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create transaction", e))?;

        row_to_transaction(&row)
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET name = $2, type = $3, category_id = $4, amount = $5, date = $6,
                group_id = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(transaction.id().value())
        .bind(transaction.name())
        .bind(transaction.kind().as_str())
        .bind(transaction.category_id().value())
        .bind(transaction.amount())
        .bind(transaction.date())
        .bind(transaction.group_id().map(|g| g.value()))
        .bind(transaction.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update transaction", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Transaction not found"));
        }

        Ok(transaction.clone())
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete transaction", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, DomainError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions"
        ));
        push_filter(&mut builder, &query.filter);

        let direction = query.order.keyword();
        builder.push(format!(
            " ORDER BY {} {}, id {}",
            query.sort_by.column(),
            direction,
            direction
        ));

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(to_bind(limit));
        }
        builder.push(" OFFSET ").push_bind(to_bind(query.offset));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list transactions", e))?;

        rows.iter().map(row_to_transaction).collect()
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<usize, DomainError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to count transactions", e))?;

        Ok(count as usize)
    }

    async fn delete_matching(&self, filter: &TransactionFilter) -> Result<usize, DomainError> {
        let mut builder = QueryBuilder::new("DELETE FROM transactions");
        push_filter(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete transactions", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_by_group(&self, group_id: GroupId) -> Result<usize, DomainError> {
        self.delete_matching(&TransactionFilter::for_group(group_id))
            .await
    }
}

fn row_to_transaction(row: &PgRow) -> Result<Transaction, DomainError> {
    let read = |e: sqlx::Error| storage_error("Failed to decode transaction row", e);
    let kind: String = row.try_get("type").map_err(read)?;
    let group_id: Option<i64> = row.try_get("group_id").map_err(read)?;

    Ok(Transaction::restore(
        TransactionId::new(row.try_get("id").map_err(read)?),
        row.try_get("name").map_err(read)?,
        kind.parse()?,
        CategoryId::new(row.try_get("category_id").map_err(read)?),
        row.try_get("amount").map_err(read)?,
        row.try_get("date").map_err(read)?,
        UserId::new(row.try_get("user_id").map_err(read)?),
        group_id.map(GroupId::new),
        row.try_get("created_at").map_err(read)?,
        row.try_get("updated_at").map_err(read)?,
    ))
}
