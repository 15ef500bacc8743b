//! Agent runtime for the Nexus HR pipeline.
//!
//! Provides the pieces a multi-stage reasoning pipeline is built from:
//!
//! - [`RunHistory`] / [`WorkItem`] — the append-only transcript threaded
//!   through the stages;
//! - [`ReasoningOracle`] — the seam behind which the language model lives;
//! - [`AgentTool`] — gateways a stage may invoke before finalizing;
//! - [`Agent`] — the bounded loop that drives an oracle to a
//!   contract-conformant payload.
//!
//! The runtime is application-agnostic; stage semantics (instructions,
//! contracts, gateways) belong to the caller.

pub mod agent;
pub mod error;
pub mod history;
pub mod openai;
pub mod oracle;
pub mod testing;
pub mod tool;

pub use agent::{Agent, AgentRun, DEFAULT_MAX_TURNS};
pub use error::{AgentError, Result};
pub use history::{RunHistory, WorkItem};
pub use openai::OpenAiOracle;
pub use oracle::{
    ModelSettings, OracleRequest, OracleTurn, OutputContract, ReasoningOracle, ToolCallRequest,
};
pub use tool::{AgentTool, ToolOutput, ToolSpec};
