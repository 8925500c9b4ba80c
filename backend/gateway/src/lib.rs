//! StyleScout Gateway HTTP API Server
//!
//! Serves the idea → search → analysis pipeline and the annotated markdown
//! renderer as JSON endpoints.

pub mod error;
pub mod handlers;
pub mod health_api;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, start_server};
pub use state::GatewayState;
