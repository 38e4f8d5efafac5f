//! # A1 Mediator
//!
//! REST service for policy types and instances. Instance changes start or
//! stop the xApp bound to the policy type.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::MediatorConfig;
pub use router::build_router;
pub use state::AppState;
