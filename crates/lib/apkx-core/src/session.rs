use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Output root of the most recent successful extraction.
///
/// Cloning shares the underlying slot, so every handler observes the same value.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    output_root: Arc<RwLock<Option<PathBuf>>>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current output root, if an extraction has succeeded.
    pub async fn output_root(&self) -> Option<PathBuf> {
        self.output_root.read().await.clone()
    }

    /// Replaces the current output root.
    pub async fn record_extraction(&self, output_root: PathBuf) {
        *self.output_root.write().await = Some(output_root);
    }
}
