//! API layer - HTTP endpoints and middleware

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod groups;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod transactions;
pub mod types;
pub mod users;

pub use middleware::RequireUser;
pub use router::{api_routes, create_router_with_state};
pub use state::AppState;
