use apkx_core::control::{MatchSender, SearchRequest};
use rmcp::{
    ErrorData,
    RoleServer,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    service::RequestContext,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ApkxMcp;
use crate::envelope::ToolOutcome;
use crate::progress::ProgressForwarder;

/// Parameters for searching extracted output.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Literal, case-sensitive substrings; a line matching several yields several hits.
    #[schemars(length(min = 1))]
    pub query_strings: Vec<String>,
    /// Directory to search instead of the last extraction's output root.
    #[serde(default)]
    pub directory: Option<String>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl ApkxMcp {
    #[tool(description = "Search .java, .smali, .xml and .txt files for literal strings. Matches stream as progress notifications in batches of 5; the result reports the total count.")]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let progress = ProgressForwarder::for_request(&context);
        let outcome = self
            .search_outcome(params, progress.as_ref().map(ProgressForwarder::sender))
            .await;
        if let Some(progress) = progress {
            progress.finish().await;
        }
        Ok(outcome.into())
    }
}

impl ApkxMcp {
    pub(crate) async fn search_outcome(
        &self,
        params: SearchParams,
        progress: Option<MatchSender>,
    ) -> ToolOutcome {
        let request = SearchRequest {
            queries: params.query_strings,
            directory: params.directory,
        };
        match self.control.search(request, progress).await {
            Ok(report) if report.total_matches == 0 => ToolOutcome::text(format!(
                "Search complete: no matches found ({} files scanned).",
                report.files_scanned
            )),
            Ok(report) => ToolOutcome::text(format!(
                "Search complete: {} matches in {} files scanned.",
                report.total_matches, report.files_scanned
            )),
            Err(err) => {
                warn!("search failed: {err}");
                ToolOutcome::error(format!("Search failed: {err}"))
            }
        }
    }
}
