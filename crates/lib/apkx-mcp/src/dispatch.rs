//! Tool dispatch: every call resolves to a [`ToolOutcome`]-shaped result.
//!
//! Unknown tools and argument errors from the router become error envelopes naming
//! the tool, and handler panics are caught on the spawned task.

use rmcp::{
    ErrorData,
    RoleServer,
    handler::server::tool::ToolCallContext,
    model::{CallToolRequestParams, CallToolResult, ErrorCode},
    service::RequestContext,
};
use tracing::{error, warn};

use crate::ApkxMcp;
use crate::envelope::ToolOutcome;

impl ApkxMcp {
    pub(crate) async fn dispatch(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> CallToolResult {
        let tool_name = request.name.to_string();
        if !self.has_tool(&tool_name) {
            warn!("rejecting call to unknown tool {tool_name}");
            return unknown_tool(&tool_name).into();
        }

        let service = self.clone();
        let call = tokio::spawn(async move {
            let call_context = ToolCallContext::new(&service, request, context);
            service.tool_router.call(call_context).await
        });

        match call.await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!("tool {tool_name} rejected: {}", err.message);
                router_error(&tool_name, &err).into()
            }
            Err(err) => {
                error!("tool {tool_name} panicked: {err}");
                ToolOutcome::error(format!("Tool '{tool_name}' failed unexpectedly: {err}")).into()
            }
        }
    }

    pub(crate) fn has_tool(&self, name: &str) -> bool {
        self.tool_router.map.contains_key(name)
    }
}

fn unknown_tool(name: &str) -> ToolOutcome {
    ToolOutcome::error(format!(
        "Unknown tool '{name}'. Available tools: extract, search, readFile."
    ))
}

fn router_error(tool_name: &str, err: &ErrorData) -> ToolOutcome {
    if err.code == ErrorCode::INVALID_PARAMS {
        ToolOutcome::error(format!(
            "Invalid arguments for tool '{tool_name}': {}",
            err.message
        ))
    } else {
        ToolOutcome::error(format!("Tool '{tool_name}' failed: {}", err.message))
    }
}
