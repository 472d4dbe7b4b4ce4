//! Transaction service

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::category::{CategoryId, CategoryRepository};
use crate::domain::group::{GroupId, GroupRepository};
use crate::domain::transaction::{
    validate_amount, validate_transaction_name, NewTransaction, SortField, SortOrder, Transaction,
    TransactionFilter, TransactionId, TransactionQuery, TransactionRepository, TransactionType,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const DEFAULT_CLEANUP_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct CreateTransactionRequest {
    pub name: String,
    pub kind: TransactionType,
    pub category_id: CategoryId,
    pub amount: f64,
    /// Defaults to the current time
    pub date: Option<DateTime<Utc>>,
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionRequest {
    pub name: Option<String>,
    pub kind: Option<TransactionType>,
    pub category_id: Option<CategoryId>,
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    /// `Some(None)` detaches the transaction from its group
    pub group_id: Option<Option<GroupId>>,
}

#[derive(Debug, Clone, Default)]
pub struct ListTransactionsRequest {
    pub filter: TransactionFilter,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub skip: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub failed: usize,
}

pub struct TransactionService {
    transactions: Arc<dyn TransactionRepository>,
    categories: Arc<dyn CategoryRepository>,
    groups: Arc<dyn GroupRepository>,
}

fn not_found() -> DomainError {
    DomainError::not_found("Transaction not found")
}

impl TransactionService {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        categories: Arc<dyn CategoryRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self {
            transactions,
            categories,
            groups,
        }
    }

    async fn ensure_category(&self, category_id: CategoryId) -> Result<(), DomainError> {
        match self.categories.get(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation("Category not found")),
        }
    }

    async fn ensure_group_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<(), DomainError> {
        match self.groups.get(group_id).await? {
            Some(group) if group.is_member(user_id) => Ok(()),
            _ => Err(DomainError::validation(format!(
                "Group with id {} not found or access denied",
                group_id
            ))),
        }
    }

    pub async fn create(
        &self,
        user_id: UserId,
        request: CreateTransactionRequest,
    ) -> Result<Transaction, DomainError> {
        let name = request.name.trim().to_string();
        validate_transaction_name(&name)?;
        validate_amount(request.amount)?;
        self.ensure_category(request.category_id).await?;

        if let Some(group_id) = request.group_id {
            self.ensure_group_member(group_id, user_id).await?;
        }

        let transaction = self
            .transactions
            .create(NewTransaction {
                name,
                kind: request.kind,
                category_id: request.category_id,
                amount: request.amount,
                date: request.date.unwrap_or_else(Utc::now),
                user_id,
                group_id: request.group_id,
            })
            .await?;

        info!(
            transaction_id = %transaction.id(),
            user_id = %user_id,
            "Transaction created"
        );
        Ok(transaction)
    }

    /// Only the owner can see a transaction; anyone else gets not found
    pub async fn get(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Transaction, DomainError> {
        match self.transactions.get(id).await? {
            Some(tx) if tx.user_id() == user_id => Ok(tx),
            _ => Err(not_found()),
        }
    }

    /// One page of the user's transactions plus the unpaginated total
    pub async fn list(
        &self,
        user_id: UserId,
        request: ListTransactionsRequest,
    ) -> Result<(Vec<Transaction>, usize), DomainError> {
        let mut filter = request.filter;
        filter.user_id = Some(user_id);

        let total = self.transactions.count(&filter).await?;
        let query = TransactionQuery::new(filter)
            .sorted(request.sort_by, request.order)
            .paginate(request.skip, request.limit);
        let items = self.transactions.find(&query).await?;

        Ok((items, total))
    }

    pub async fn update(
        &self,
        user_id: UserId,
        id: TransactionId,
        request: UpdateTransactionRequest,
    ) -> Result<Transaction, DomainError> {
        let mut transaction = self.get(user_id, id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            validate_transaction_name(&name)?;
            transaction.set_name(name);
        }
        if let Some(amount) = request.amount {
            validate_amount(amount)?;
            transaction.set_amount(amount);
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
            transaction.set_category(category_id);
        }
        if let Some(kind) = request.kind {
            transaction.set_kind(kind);
        }
        if let Some(date) = request.date {
            transaction.set_date(date);
        }
        if let Some(group_id) = request.group_id {
            if let Some(group_id) = group_id {
                self.ensure_group_member(group_id, user_id).await?;
            }
            transaction.set_group(group_id);
        }

        self.transactions.update(&transaction).await
    }

    pub async fn delete(&self, user_id: UserId, id: TransactionId) -> Result<(), DomainError> {
        self.get(user_id, id).await?;

        if !self.transactions.delete(id).await? {
            return Err(not_found());
        }

        info!(transaction_id = %id, user_id = %user_id, "Transaction deleted");
        Ok(())
    }

    /// Latest transactions by date
    pub async fn recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Transaction>, DomainError> {
        let query =
            TransactionQuery::new(TransactionFilter::for_user(user_id)).paginate(0, limit);
        self.transactions.find(&query).await
    }

    /// Case-insensitive substring match on the name, newest first
    pub async fn search(
        &self,
        user_id: UserId,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, DomainError> {
        let filter = TransactionFilter::for_user(user_id).name_contains(term.trim());
        let query = TransactionQuery::new(filter).paginate(0, limit);
        self.transactions.find(&query).await
    }

    /// Create each entry independently; failures are counted, not propagated
    pub async fn import(
        &self,
        user_id: UserId,
        requests: Vec<CreateTransactionRequest>,
    ) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();

        for request in requests {
            match self.create(user_id, request).await {
                Ok(_) => outcome.imported += 1,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Failed to import transaction");
                    outcome.failed += 1;
                }
            }
        }

        info!(
            user_id = %user_id,
            imported = outcome.imported,
            failed = outcome.failed,
            "Transaction import finished"
        );
        outcome
    }

    /// Delete the user's transactions dated more than `days` days ago
    pub async fn cleanup(&self, user_id: UserId, days: i64) -> Result<usize, DomainError> {
        if days < 1 {
            return Err(DomainError::validation("Days must be at least 1"));
        }

        let cutoff = Duration::try_days(days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .ok_or_else(|| DomainError::validation("Days out of range"))?;
        let filter = TransactionFilter::for_user(user_id).before(cutoff);
        let deleted = self.transactions.delete_matching(&filter).await?;

        info!(user_id = %user_id, deleted, "Cleaned up old transactions");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::NewCategory;
    use crate::domain::group::NewGroup;
    use crate::infrastructure::category::InMemoryCategoryRepository;
    use crate::infrastructure::group::InMemoryGroupRepository;
    use crate::infrastructure::transaction::InMemoryTransactionRepository;

    struct Fixture {
        service: TransactionService,
        category: CategoryId,
        group: GroupId,
    }

    async fn fixture() -> Fixture {
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let groups = Arc::new(InMemoryGroupRepository::new());

        let category = categories
            .create(NewCategory {
                name: "Food".to_string(),
                description: None,
                kind: TransactionType::Expense,
            })
            .await
            .unwrap();
        let group = groups
            .create(NewGroup {
                name: "Flat".to_string(),
                description: None,
                owner_id: UserId::new(1),
            })
            .await
            .unwrap();

        Fixture {
            service: TransactionService::new(
                Arc::new(InMemoryTransactionRepository::new()),
                categories,
                groups,
            ),
            category: category.id(),
            group: group.id(),
        }
    }

    fn request(name: &str, amount: f64, category: CategoryId) -> CreateTransactionRequest {
        CreateTransactionRequest {
            name: name.to_string(),
            kind: TransactionType::Expense,
            category_id: category,
            amount,
            date: None,
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_date() {
        let f = fixture().await;
        let before = Utc::now();
        let tx = f
            .service
            .create(UserId::new(1), request(" Lunch ", 12.5, f.category))
            .await
            .unwrap();

        assert_eq!(tx.name(), "Lunch");
        assert!(tx.date() >= before);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let f = fixture().await;
        let user = UserId::new(1);

        let err = f
            .service
            .create(user, request("Lunch", 0.0, f.category))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Amount must be greater than zero");

        let err = f
            .service
            .create(user, request("Lunch", 5.0, CategoryId::new(99)))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Category not found");
    }

    #[tokio::test]
    async fn test_create_in_group_requires_membership() {
        let f = fixture().await;

        let mut req = request("Groceries", 40.0, f.category);
        req.group_id = Some(f.group);
        assert!(f.service.create(UserId::new(1), req.clone()).await.is_ok());

        let err = f.service.create(UserId::new(2), req).await.unwrap_err();
        assert_eq!(
            err.message(),
            format!("Group with id {} not found or access denied", f.group)
        );
    }

    #[tokio::test]
    async fn test_other_users_cannot_see_transaction() {
        let f = fixture().await;
        let tx = f
            .service
            .create(UserId::new(1), request("Lunch", 10.0, f.category))
            .await
            .unwrap();

        let err = f.service.get(UserId::new(2), tx.id()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(f.service.delete(UserId::new(2), tx.id()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_total_ignores_pagination() {
        let f = fixture().await;
        let user = UserId::new(1);
        for i in 0..5 {
            let mut req = request(&format!("Item {}", i), 10.0 + i as f64, f.category);
            req.date = Some(Utc::now() - Duration::days(i));
            f.service.create(user, req).await.unwrap();
        }

        let (items, total) = f
            .service
            .list(
                user,
                ListTransactionsRequest {
                    skip: 1,
                    limit: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name(), "Item 1");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let f = fixture().await;
        let user = UserId::new(1);
        let tx = f
            .service
            .create(user, request("Lunch", 10.0, f.category))
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                user,
                tx.id(),
                UpdateTransactionRequest {
                    amount: Some(15.0),
                    group_id: Some(Some(f.group)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), "Lunch");
        assert_eq!(updated.amount(), 15.0);
        assert_eq!(updated.group_id(), Some(f.group));
    }

    #[tokio::test]
    async fn test_search_and_recent() {
        let f = fixture().await;
        let user = UserId::new(1);
        for name in ["Coffee beans", "Rent", "Iced COFFEE"] {
            f.service
                .create(user, request(name, 3.0, f.category))
                .await
                .unwrap();
        }

        assert_eq!(f.service.search(user, "coffee", 50).await.unwrap().len(), 2);
        assert_eq!(f.service.recent(user, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_counts_failures() {
        let f = fixture().await;
        let outcome = f
            .service
            .import(
                UserId::new(1),
                vec![
                    request("Ok", 1.0, f.category),
                    request("Bad amount", -1.0, f.category),
                    request("Bad category", 1.0, CategoryId::new(42)),
                ],
            )
            .await;

        assert_eq!(
            outcome,
            ImportOutcome {
                imported: 1,
                failed: 2
            }
        );
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_old() {
        let f = fixture().await;
        let user = UserId::new(1);

        let mut old = request("Old", 1.0, f.category);
        old.date = Some(Utc::now() - Duration::days(400));
        f.service.create(user, old).await.unwrap();
        f.service
            .create(user, request("New", 1.0, f.category))
            .await
            .unwrap();

        assert_eq!(
            f.service.cleanup(user, DEFAULT_CLEANUP_DAYS).await.unwrap(),
            1
        );
        assert!(f.service.cleanup(user, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_rejects_days_beyond_calendar() {
        let f = fixture().await;
        let user = UserId::new(1);

        // Too large for a time delta
        let err = f.service.cleanup(user, i64::MAX).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(err.message(), "Days out of range");

        // Valid delta, but the cutoff would precede the earliest representable date
        let err = f.service.cleanup(user, 100_000_000).await.unwrap_err();
        assert_eq!(err.message(), "Days out of range");
    }
}
