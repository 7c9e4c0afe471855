//! HTTP surface: router assembly, shared state, request schemas and handlers.

pub mod handlers;
pub mod router;
pub mod schema;
pub mod state;

pub use router::build_router;
pub use state::AppState;
