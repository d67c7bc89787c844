//! MCP server implementation for apkx-mcp.
//!
//! This crate wires the control plane into rmcp tool handlers and exposes the
//! `extract`, `search`, and `readFile` tools.

mod dispatch;
pub mod envelope;
pub mod progress;
pub mod server;
mod tools;

use apkx_core::control::ApkxControlPlane;
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::tool::ToolRouter,
    model::{
        CallToolRequestParams,
        CallToolResult,
        ListToolsResult,
        PaginatedRequestParams,
        ServerCapabilities,
        ServerInfo,
    },
    service::RequestContext,
};

pub use tools::extract::ExtractParams;
pub use tools::read::ReadFileParams;
pub use tools::search::SearchParams;

const SERVER_INSTRUCTIONS: &str = r"apkx-mcp decompiles Android APKs and lets you search and read the result.

Workflow:
1. `extract` with `artifactPath` pointing at an APK. jadx writes Java sources to
   `jadx_output/` and apktool writes resources, smali, and the manifest to `apktool_output/`.
   The summary includes the package name and version from the manifest.
2. `search` with `queryStrings` (literal, case-sensitive). Only .java, .smali, .xml and .txt
   files are scanned. Matches stream as progress notifications in batches of 5, formatted
   `path:line: text`; the final result only reports the count. Pass `directory` to search
   somewhere other than the last extraction.
3. `readFile` with a `relativePath` from the search output to read the whole file.

Notes:
- `search` without `directory` and `readFile` always use the most recent successful extraction.
- A jadx failure is reported as a warning; an apktool failure fails the extraction.";

/// MCP server wrapper around the control plane and tool routers.
#[derive(Clone)]
pub struct ApkxMcp {
    tool_router: ToolRouter<Self>,
    control: ApkxControlPlane,
}

impl ApkxMcp {
    #[must_use]
    pub fn new(control: ApkxControlPlane) -> Self {
        let tool_router =
            Self::tool_router_extract() + Self::tool_router_search() + Self::tool_router_read();
        Self {
            tool_router,
            control,
        }
    }

    #[must_use]
    pub const fn control(&self) -> &ApkxControlPlane {
        &self.control
    }
}

impl ServerHandler for ApkxMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.dispatch(request, context).await)
    }
}
