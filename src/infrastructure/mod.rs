//! Infrastructure layer - storage backends, services and runtime plumbing

pub mod analytics;
pub mod auth;
pub mod category;
pub mod export;
pub mod group;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod transaction;
pub mod user;
