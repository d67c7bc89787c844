use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::search::{SearchError, SearchMatch, SearchReport, search_tree};

use super::ApkxControlPlane;

/// Receives each flushed batch while a search is running.
pub type MatchSender = mpsc::Sender<Vec<SearchMatch>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub queries: Vec<String>,
    /// Searched instead of the session root when set; the session is then never read.
    pub directory: Option<String>,
}

impl ApkxControlPlane {
    /// Searches the requested directory, or the last extraction, for the queries.
    ///
    /// Batches go to `progress` when one is supplied. A closed or missing receiver
    /// only loses the incremental view; the returned count is always complete.
    ///
    /// # Errors
    /// Returns `SearchError` if no query is usable, no root can be resolved, or the
    /// root is not an existing directory.
    pub async fn search(
        &self,
        request: SearchRequest,
        progress: Option<MatchSender>,
    ) -> Result<SearchReport, SearchError> {
        let queries: Vec<String> = request
            .queries
            .into_iter()
            .filter(|query| !query.is_empty())
            .collect();
        if queries.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let root = match request.directory {
            Some(dir) if dir.trim().is_empty() => return Err(SearchError::BlankDirectory),
            Some(dir) => PathBuf::from(dir.trim()),
            None => self
                .session
                .output_root()
                .await
                .ok_or(SearchError::NoSearchRoot)?,
        };

        match tokio::fs::metadata(&root).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(SearchError::NotADirectory(root)),
            Err(_) => return Err(SearchError::RootNotFound(root)),
        }

        let walk_root = root.clone();
        let report = tokio::task::spawn_blocking(move || {
            search_tree(&walk_root, &queries, |batch| {
                let Some(sender) = progress.as_ref() else {
                    return;
                };
                if sender.blocking_send(batch).is_err() {
                    debug!("progress receiver closed; continuing without streaming");
                }
            })
        })
        .await
        .map_err(|err| SearchError::Worker(err.to_string()))?;

        info!(
            root = %root.display(),
            matches = report.total_matches,
            files = report.files_scanned,
            "search finished"
        );
        Ok(report)
    }
}
