pub mod auth;
pub mod comments;
pub mod deals;
pub mod notes;
pub mod packs;
pub mod suppliers;

use crate::error::AppError;

/// Run a closure over the synchronous store off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> negopack_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        .map_err(AppError::from)
}
