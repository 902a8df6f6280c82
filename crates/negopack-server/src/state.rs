use std::sync::Arc;
use tokio::sync::broadcast;

use negopack_core::comment::StakeholderComment;
use negopack_core::Store;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// `None` when no provider API key was configured; pack generation
    /// endpoints return 503 in that case.
    pub ai: Option<Arc<negopack_ai::Client>>,
    pub comment_tx: broadcast::Sender<StakeholderComment>,
}

impl AppState {
    pub fn new(store: Arc<Store>, ai: Option<Arc<negopack_ai::Client>>) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            store,
            ai,
            comment_tx: tx,
        }
    }
}
