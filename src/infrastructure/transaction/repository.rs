//! In-memory transaction repository

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::group::GroupId;
use crate::domain::transaction::{
    NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionQuery,
    TransactionRepository,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    transactions: BTreeMap<TransactionId, Transaction>,
}

#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    state: RwLock<State>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self.state.read().await.transactions.get(&id).cloned())
    }

    async fn create(&self, transaction: NewTransaction) -> Result<Transaction, DomainError> {
        let mut state = self.state.write().await;

        state.last_id += 1;
        let transaction = Transaction::from_new(TransactionId::new(state.last_id), transaction);
        state
            .transactions
            .insert(transaction.id(), transaction.clone());

        Ok(transaction)
    }

    async fn update(&self, transaction: &Transaction) -> Result<Transaction, DomainError> {
        let mut state = self.state.write().await;

        match state.transactions.get_mut(&transaction.id()) {
            Some(stored) => {
                *stored = transaction.clone();
                Ok(transaction.clone())
            }
            None => Err(DomainError::not_found("Transaction not found")),
        }
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, DomainError> {
        Ok(self.state.write().await.transactions.remove(&id).is_some())
    }

    async fn find(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, DomainError> {
        let state = self.state.read().await;
        Ok(query.apply(state.transactions.values()))
    }

    async fn count(&self, filter: &TransactionFilter) -> Result<usize, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .values()
            .filter(|tx| filter.matches(tx))
            .count())
    }

    async fn delete_matching(&self, filter: &TransactionFilter) -> Result<usize, DomainError> {
        let mut state = self.state.write().await;
        let before = state.transactions.len();
        state.transactions.retain(|_, tx| !filter.matches(tx));
        Ok(before - state.transactions.len())
    }

    async fn delete_by_group(&self, group_id: GroupId) -> Result<usize, DomainError> {
        self.delete_matching(&TransactionFilter::for_group(group_id))
            .await
    }
}
