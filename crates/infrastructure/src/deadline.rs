//! Upper bound on the duration of a single store call.

use std::future::Future;
use std::time::Duration;

use classroom_core::{AppError, AppResult};
use tracing::warn;

/// Deadline for ordinary reads and writes.
pub(crate) const STORE_DEADLINE: Duration = Duration::from_secs(5);

/// Deadline for list queries and token lookups, which sit on the request path
/// of most endpoints.
pub(crate) const LOOKUP_DEADLINE: Duration = Duration::from_secs(3);

/// Runs `call`, failing with `Internal` once `deadline` elapses. The call is
/// dropped on expiry and never retried.
pub(crate) async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    call: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, deadline_ms = deadline.as_millis(), "store call timed out");
            Err(AppError::Internal(format!("failed to {operation}: timed out")))
        }
    }
}
