use rmcp::model::{CallToolResult, Content};

/// Uniform result of every tool call.
///
/// Success and failure are separate variants so a failure can never carry partial
/// success text. Converted to a `CallToolResult` at the protocol boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Ok(Vec<String>),
    Err { message: String, details: Vec<String> },
}

impl ToolOutcome {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Ok(vec![text.into()])
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Err {
            message: message.into(),
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            Self::Ok(mut blocks) => {
                blocks.push(detail.into());
                Self::Ok(blocks)
            }
            Self::Err {
                message,
                mut details,
            } => {
                details.push(detail.into());
                Self::Err { message, details }
            }
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Err { .. })
    }

    /// Text blocks in the order they are sent; an error's message comes first.
    #[must_use]
    pub fn blocks(&self) -> Vec<&str> {
        match self {
            Self::Ok(blocks) => blocks.iter().map(String::as_str).collect(),
            Self::Err { message, details } => std::iter::once(message.as_str())
                .chain(details.iter().map(String::as_str))
                .collect(),
        }
    }
}

impl From<ToolOutcome> for CallToolResult {
    fn from(outcome: ToolOutcome) -> Self {
        match outcome {
            ToolOutcome::Ok(blocks) => Self::success(blocks.into_iter().map(Content::text).collect()),
            ToolOutcome::Err { message, details } => Self::error(
                std::iter::once(message)
                    .chain(details)
                    .map(Content::text)
                    .collect(),
            ),
        }
    }
}
