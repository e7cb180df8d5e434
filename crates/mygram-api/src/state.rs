use std::sync::Arc;

use mygram_db::Database;
use tracing::error;

use crate::credentials::TokenService;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: &str) -> AppState {
        Arc::new(Self {
            db,
            tokens: TokenService::new(jwt_secret),
        })
    }
}

/// Run blocking work (SQLite, Argon2) off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
}
