//! Eden curation service library
//!
//! This module provides the components of the `edend` daemon:
//! - REST API handlers over the curation stores
//! - Error mapping to HTTP status codes
//! - Layered configuration
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use api::{create_router, AppState};
pub use config::ServiceConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
