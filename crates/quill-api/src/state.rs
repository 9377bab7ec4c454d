use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::time::{Instant, timeout_at};
use tracing::error;

use quill_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub token_secret: String,
    pub token_ttl: chrono::Duration,
    /// Upper bound on the blocking work of a single request.
    pub request_timeout: Duration,
}

/// The point in time by which a request must have finished its blocking
/// work. Set once when the request enters the router (see
/// `middleware::start_deadline`) and shared by every call the handler makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(pub Instant);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    /// Run `f` on the blocking pool. Past the deadline the caller gets
    /// `ApiError::Timeout`; the closure itself still runs to completion.
    pub async fn run_blocking<F, T>(self, context: &'static str, f: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(f);

        match timeout_at(self.0, task).await {
            Err(_) => Err(ApiError::Timeout),
            Ok(Err(e)) => {
                error!("spawn_blocking join error: {}", e);
                Err(ApiError::Internal(context.to_string()))
            }
            Ok(Ok(value)) => Ok(value),
        }
    }
}

impl FromRequestParts<AppState> for Deadline {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Deadline>()
            .copied()
            .unwrap_or_else(|| state.deadline()))
    }
}

impl AppStateInner {
    /// A fresh deadline `request_timeout` from now.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }

    /// Run storage work off the async runtime, bounded by the request's
    /// `deadline`. A timed-out closure still runs its transaction to commit
    /// or rollback.
    pub async fn db_call<F, T>(
        self: &Arc<Self>,
        deadline: Deadline,
        context: &'static str,
        f: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> quill_db::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        deadline
            .run_blocking(context, move || f(&state.db))
            .await?
            .map_err(|e| ApiError::from_db(e, context))
    }
}
