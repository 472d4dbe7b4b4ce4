//! Transaction repository trait

use async_trait::async_trait;

use super::entity::{NewTransaction, Transaction, TransactionId};
use super::query::{TransactionFilter, TransactionQuery};
use crate::domain::group::GroupId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, DomainError>;

    async fn create(&self, transaction: NewTransaction) -> Result<Transaction, DomainError>;

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, DomainError>;

    async fn delete(&self, id: TransactionId) -> Result<bool, DomainError>;

    /// Matching transactions in query order, paginated
    async fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, DomainError>;

    /// Number of transactions matching the filter, ignoring pagination
    async fn count(&self, filter: &TransactionFilter) -> Result<usize, DomainError>;

    /// Delete every matching transaction, returning how many were removed
    async fn delete_matching(&self, filter: &TransactionFilter) -> Result<usize, DomainError>;

    /// Remove all transactions attached to a group
    async fn delete_by_group(&self, group_id: GroupId) -> Result<usize, DomainError>;
}
