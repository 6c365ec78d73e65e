//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod middleware;
pub mod outbound;
pub mod router;
pub mod state;
pub mod types;
pub mod webhooks;

pub use router::create_router;
pub use state::AppState;
