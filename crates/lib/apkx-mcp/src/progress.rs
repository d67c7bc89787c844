//! Forwards search batches to the client as MCP progress notifications.

use std::future::Future;

use apkx_core::control::MatchSender;
use apkx_core::search::SearchMatch;
use rmcp::RoleServer;
use rmcp::model::ProgressNotificationParam;
use rmcp::service::RequestContext;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Batches buffered between the search worker and the notifier.
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// One rendered batch plus the running number of matches delivered so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChunk {
    pub delivered: usize,
    pub text: String,
}

pub struct ProgressForwarder {
    sender: MatchSender,
    task: JoinHandle<()>,
}

impl ProgressForwarder {
    /// Forwarder bound to the caller's progress token, or `None` when the request
    /// did not ask for progress.
    pub fn for_request(context: &RequestContext<RoleServer>) -> Option<Self> {
        let token = context.meta.get_progress_token()?;
        let peer = context.peer.clone();
        Some(Self::spawn(move |chunk: ProgressChunk| {
            let peer = peer.clone();
            let progress_token = token.clone();
            async move {
                #[allow(clippy::cast_precision_loss)]
                let param = ProgressNotificationParam {
                    progress_token,
                    progress: chunk.delivered as f64,
                    total: None,
                    message: Some(chunk.text),
                };
                if let Err(err) = peer.notify_progress(param).await {
                    debug!("dropping search progress: {err}");
                }
            }
        }))
    }

    /// Spawns the task that drains batches into `emit`, one call per batch.
    pub fn spawn<F, Fut>(mut emit: F) -> Self
    where
        F: FnMut(ProgressChunk) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<Vec<SearchMatch>>(PROGRESS_CHANNEL_CAPACITY);
        let task = tokio::spawn(async move {
            let mut delivered = 0;
            while let Some(batch) = receiver.recv().await {
                delivered += batch.len();
                emit(ProgressChunk {
                    delivered,
                    text: render_batch(&batch),
                })
                .await;
            }
        });
        Self { sender, task }
    }

    #[must_use]
    pub fn sender(&self) -> MatchSender {
        self.sender.clone()
    }

    /// Waits until every batch sent so far has been emitted.
    pub async fn finish(self) {
        let Self { sender, task } = self;
        drop(sender);
        if let Err(err) = task.await {
            warn!("search progress forwarder stopped: {err}");
        }
    }
}

/// One line per match: `path:line: text`.
#[must_use]
pub fn render_batch(batch: &[SearchMatch]) -> String {
    batch
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
