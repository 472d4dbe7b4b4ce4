//! Transaction infrastructure: repositories and service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresTransactionRepository;
pub use repository::InMemoryTransactionRepository;
pub use service::{
    CreateTransactionRequest, ImportOutcome, ListTransactionsRequest, TransactionService,
    UpdateTransactionRequest, DEFAULT_CLEANUP_DAYS, DEFAULT_RECENT_LIMIT, DEFAULT_SEARCH_LIMIT,
};
