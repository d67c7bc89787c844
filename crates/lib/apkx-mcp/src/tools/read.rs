use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::ApkxMcp;
use crate::envelope::ToolOutcome;

/// Parameters for reading one extracted file.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadFileParams {
    /// Path relative to the last extraction's output root, as reported by `search`.
    pub relative_path: String,
}

#[tool_router(router = tool_router_read, vis = "pub")]
impl ApkxMcp {
    #[tool(name = "readFile", description = "Read a file from the last extraction by its path relative to the output root.")]
    async fn read_file(
        &self,
        Parameters(params): Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.read_file_outcome(params).await.into())
    }
}

impl ApkxMcp {
    pub(crate) async fn read_file_outcome(&self, params: ReadFileParams) -> ToolOutcome {
        match self.control.read_file(&params.relative_path).await {
            Ok(content) => ToolOutcome::text(format!(
                "File: {}\n\n{}",
                content.relative_path, content.text
            )),
            Err(err) => ToolOutcome::error(format!("Read failed: {err}")),
        }
    }
}
