//! Tool protocol: typed specs in, text out.
//!
//! Tools never raise across the stage boundary. Whatever goes wrong inside a
//! tool comes back as an error-flagged [`ToolOutput`] that is appended to the
//! transcript, so the reasoning oracle can inspect the failure and retry with
//! corrected arguments within the same turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declaration of a tool exposed to the reasoning oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's arguments object.
    pub parameters: Value,
}

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A gateway a stage may invoke autonomously before finalizing its output.
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Executes the tool. Must not fail: invalid arguments or downstream
    /// failures are reported through [`ToolOutput::error`].
    async fn invoke(&self, arguments: Value) -> ToolOutput;
}
