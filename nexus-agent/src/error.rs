//! Error taxonomy for the agent runtime.

use thiserror::Error;

/// Errors surfaced by agent runs and oracle adapters.
///
/// Tool failures are deliberately absent: tools report failure as
/// error-flagged text inside the run transcript so the reasoning oracle can
/// read and react to them within the same stage turn.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport, quota or auth failure while invoking the reasoning oracle.
    /// Always fatal; retry policy belongs to the caller, not the runtime.
    #[error("oracle invocation failed: {0}")]
    Oracle(String),

    /// The agent produced a payload that does not conform to its output
    /// contract. Payloads are rejected, never coerced or repaired.
    #[error("agent '{agent}' violated its output contract: {reason}")]
    ContractViolation { agent: String, reason: String },

    /// The oracle completed normally but produced no final payload.
    #[error("agent '{agent}' completed without a final output")]
    NoFinalOutput { agent: String },

    /// The agent kept requesting tool calls without ever finalizing.
    #[error("agent '{agent}' exceeded the tool-loop limit of {limit} turns")]
    ToolLoopExceeded { agent: String, limit: usize },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
