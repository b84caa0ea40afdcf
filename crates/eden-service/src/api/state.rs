//! Application state for API handlers

use crate::error::{ApiError, ApiResult};
use eden_curation::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Curation stores. One lock serializes every read-modify-write cycle.
    pub registry: Arc<Mutex<Registry>>,

    /// Service version
    pub version: String,

    /// Service start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Run `f` against the stores on the blocking pool, holding the registry lock throughout.
    /// Store calls read and rewrite whole JSON files, so they stay off the async workers.
    pub async fn with_registry<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Registry) -> ApiResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let registry = self.registry.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || f(&registry))
            .await
            .map_err(|e| ApiError::Internal(format!("registry task failed: {e}")))?
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_formats() {
        let mut state = AppState::new(Registry::open("unused"));
        assert!(state.uptime().ends_with('s'));

        state.started_at = chrono::Utc::now() - chrono::Duration::seconds(125);
        assert_eq!(state.uptime(), "2m 5s");

        state.started_at = chrono::Utc::now() - chrono::Duration::seconds(7300);
        assert_eq!(state.uptime(), "2h 1m");
    }

    #[tokio::test]
    async fn test_with_registry_runs_store_calls() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(Registry::open(dir.path()));

        let listed = state
            .with_registry(|registry| Ok(registry.collections.list()?))
            .await
            .unwrap();
        assert!(listed.is_empty());

        let failed = state
            .with_registry(|_| -> ApiResult<()> { Err(ApiError::Conflict("taken".to_string())) })
            .await;
        assert!(matches!(failed, Err(ApiError::Conflict(_))));

        // The lock is released once the blocking call returns
        assert!(state.registry.try_lock().is_ok());
    }
}
