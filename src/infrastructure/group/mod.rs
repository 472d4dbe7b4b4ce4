//! Group infrastructure: repositories and service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresGroupRepository;
pub use repository::InMemoryGroupRepository;
pub use service::{CreateGroupRequest, GroupService, UpdateGroupRequest};

pub(crate) use service::require_member;
