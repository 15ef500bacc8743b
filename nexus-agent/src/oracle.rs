//! The reasoning oracle seam.
//!
//! The language model is an external collaborator: it receives instructions,
//! the transcript so far, the tools it may call and the output contract it
//! must satisfy, and answers with exactly one [`OracleTurn`]. Everything else
//! (transport, retries, token accounting) lives behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::history::WorkItem;
use crate::tool::ToolSpec;

/// Determinism and creativity controls for one oracle invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub parallel_tool_calls: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            max_tokens: 2048,
            parallel_tool_calls: true,
        }
    }
}

/// The schema an agent's final payload must conform to.
#[derive(Debug, Clone)]
pub struct OutputContract {
    /// Short identifier used in structured-output requests and errors.
    pub name: String,
    /// JSON schema the final payload is validated against.
    pub schema: Value,
}

impl OutputContract {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A tool invocation requested by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub tool: String,
    pub arguments: Value,
}

/// One oracle response within an agent turn.
#[derive(Debug, Clone)]
pub enum OracleTurn {
    /// The oracle wants these tools invoked before it can finalize.
    /// Invocations within one turn carry no ordering guarantee.
    ToolCalls(Vec<ToolCallRequest>),
    /// A candidate final payload. Still subject to contract validation.
    Final(Value),
    /// Completed normally but produced nothing. The caller treats this as a
    /// contract violation; it is never silently ignored.
    Empty,
}

/// Everything an oracle needs for one completion.
#[derive(Debug)]
pub struct OracleRequest<'a> {
    pub agent: &'a str,
    pub instructions: &'a str,
    /// Full run history plus the items produced so far in this stage turn.
    pub transcript: &'a [WorkItem],
    pub tools: &'a [ToolSpec],
    pub contract: &'a OutputContract,
    pub settings: &'a ModelSettings,
}

/// Opaque reasoning oracle. Implementations must fail loudly (return
/// [`crate::AgentError::Oracle`]) on transport or auth problems; an absent
/// payload after normal completion is expressed as [`OracleTurn::Empty`].
#[async_trait]
pub trait ReasoningOracle: Send + Sync {
    async fn complete(&self, request: OracleRequest<'_>) -> Result<OracleTurn>;
}
