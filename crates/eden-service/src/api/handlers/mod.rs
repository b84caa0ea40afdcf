//! API request handlers

mod collaborations;
mod collections;
mod health;
mod sessions;
mod works;

pub use collaborations::*;
pub use collections::*;
pub use health::*;
pub use sessions::*;
pub use works::*;

use crate::error::{ApiError, ApiResult};

/// Required identifier from a request body or query; blank counts as missing
fn required<T: From<String>>(value: Option<String>, field: &str) -> ApiResult<T> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(T::from(value)),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}
