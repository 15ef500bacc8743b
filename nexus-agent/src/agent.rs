//! The bounded agent loop.
//!
//! An [`Agent`] binds a name, an instruction text, an output contract and a
//! set of tools. Running it drives the oracle until it produces a conformant
//! final payload: tool calls requested in one turn are dispatched
//! concurrently and their results fed back, and the loop is capped at
//! [`Agent::max_turns`] turns so a non-converging oracle cannot spin forever.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::history::{RunHistory, WorkItem};
use crate::oracle::{ModelSettings, OracleRequest, OracleTurn, OutputContract, ReasoningOracle};
use crate::tool::{AgentTool, ToolOutput, ToolSpec};

/// Default cap on oracle turns within a single agent run.
pub const DEFAULT_MAX_TURNS: usize = 6;

/// One reasoning stage: a named unit of work bound to one instruction text,
/// one output contract and zero or more tools.
pub struct Agent {
    name: String,
    instructions: String,
    contract: OutputContract,
    tools: Vec<Arc<dyn AgentTool>>,
    settings: ModelSettings,
    max_turns: usize,
}

/// Outcome of a successful agent run.
///
/// `new_items` is the delta this run produced; the caller owns the history
/// and decides when to append it.
#[derive(Debug)]
pub struct AgentRun {
    pub new_items: Vec<WorkItem>,
    /// Canonical JSON text of the final payload.
    pub output_text: String,
    /// The contract-conformant final payload.
    pub final_output: Value,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        contract: OutputContract,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            contract,
            tools: Vec::new(),
            settings: ModelSettings::default(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn AgentTool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the agent against the given history.
    ///
    /// The history itself is not mutated; all items produced here are
    /// returned in [`AgentRun::new_items`] for the caller to append.
    pub async fn run(
        &self,
        history: &RunHistory,
        oracle: &dyn ReasoningOracle,
    ) -> Result<AgentRun> {
        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();
        let mut transcript: Vec<WorkItem> = history.items().to_vec();
        let mut new_items: Vec<WorkItem> = Vec::new();

        for turn in 0..self.max_turns {
            let request = OracleRequest {
                agent: &self.name,
                instructions: &self.instructions,
                transcript: &transcript,
                tools: &specs,
                contract: &self.contract,
                settings: &self.settings,
            };
            match oracle.complete(request).await? {
                OracleTurn::ToolCalls(calls) => {
                    debug!(agent = %self.name, turn, count = calls.len(), "dispatching tool calls");
                    for call in &calls {
                        let item = WorkItem::ToolCall {
                            call_id: call.call_id.clone(),
                            tool: call.tool.clone(),
                            arguments: call.arguments.clone(),
                        };
                        transcript.push(item.clone());
                        new_items.push(item);
                    }
                    let mut pending = FuturesUnordered::new();
                    for call in calls {
                        let tool = self
                            .tools
                            .iter()
                            .find(|t| t.spec().name == call.tool)
                            .cloned();
                        pending.push(async move {
                            let output = match tool {
                                Some(tool) => tool.invoke(call.arguments.clone()).await,
                                None => {
                                    ToolOutput::error(format!("unknown tool: {}", call.tool))
                                }
                            };
                            (call, output)
                        });
                    }
                    while let Some((call, output)) = pending.next().await {
                        if output.is_error {
                            warn!(agent = %self.name, tool = %call.tool, "tool reported failure");
                        }
                        let item = WorkItem::ToolResult {
                            call_id: call.call_id,
                            tool: call.tool,
                            output: output.content,
                            is_error: output.is_error,
                        };
                        transcript.push(item.clone());
                        new_items.push(item);
                    }
                }
                OracleTurn::Final(value) => {
                    self.check_contract(&value)?;
                    let output_text = serde_json::to_string(&value)?;
                    new_items.push(WorkItem::AgentMessage {
                        agent: self.name.clone(),
                        text: output_text.clone(),
                    });
                    debug!(agent = %self.name, turn, "final output accepted");
                    return Ok(AgentRun {
                        new_items,
                        output_text,
                        final_output: value,
                    });
                }
                OracleTurn::Empty => {
                    return Err(AgentError::NoFinalOutput {
                        agent: self.name.clone(),
                    });
                }
            }
        }

        Err(AgentError::ToolLoopExceeded {
            agent: self.name.clone(),
            limit: self.max_turns,
        })
    }

    /// Validates a candidate payload against the output contract. Rejects,
    /// never coerces.
    fn check_contract(&self, value: &Value) -> Result<()> {
        let compiled = jsonschema::JSONSchema::compile(&self.contract.schema).map_err(|e| {
            AgentError::ContractViolation {
                agent: self.name.clone(),
                reason: format!("contract schema '{}' does not compile: {e}", self.contract.name),
            }
        })?;
        if let Err(errors) = compiled.validate(value) {
            let reasons: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(AgentError::ContractViolation {
                agent: self.name.clone(),
                reason: reasons.join("; "),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ToolCallRequest;
    use crate::testing::ScriptedOracle;
    use async_trait::async_trait;
    use serde_json::json;

    fn answer_contract() -> OutputContract {
        OutputContract::new(
            "answer",
            json!({
                "type": "object",
                "properties": {"answer": {"type": "string"}},
                "required": ["answer"],
                "additionalProperties": false
            }),
        )
    }

    struct EchoTool;

    #[async_trait]
    impl AgentTool for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: "echoes its arguments".into(),
                parameters: json!({"type": "object"}),
            }
        }

        async fn invoke(&self, arguments: Value) -> ToolOutput {
            ToolOutput::text(arguments.to_string())
        }
    }

    #[tokio::test]
    async fn direct_final_output_produces_one_agent_message() {
        let oracle = ScriptedOracle::new([OracleTurn::Final(json!({"answer": "42"}))]);
        let agent = Agent::new("Solver", "answer the question", answer_contract());
        let run = agent.run(&RunHistory::seeded("q"), &oracle).await.unwrap();

        assert_eq!(run.final_output, json!({"answer": "42"}));
        assert_eq!(run.new_items.len(), 1);
        assert!(matches!(run.new_items[0], WorkItem::AgentMessage { .. }));
    }

    #[tokio::test]
    async fn tool_calls_are_recorded_before_their_results() {
        let oracle = ScriptedOracle::new([
            OracleTurn::ToolCalls(vec![ToolCallRequest {
                call_id: "c1".into(),
                tool: "echo".into(),
                arguments: json!({"x": 1}),
            }]),
            OracleTurn::Final(json!({"answer": "done"})),
        ]);
        let agent = Agent::new("Solver", "use the tool", answer_contract())
            .with_tool(Arc::new(EchoTool));
        let run = agent.run(&RunHistory::seeded("q"), &oracle).await.unwrap();

        assert_eq!(run.new_items.len(), 3);
        assert!(matches!(run.new_items[0], WorkItem::ToolCall { .. }));
        match &run.new_items[1] {
            WorkItem::ToolResult {
                output, is_error, ..
            } => {
                assert!(!is_error);
                assert_eq!(output, "{\"x\":1}");
            }
            other => panic!("expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_comes_back_as_error_result_not_hard_failure() {
        let oracle = ScriptedOracle::new([
            OracleTurn::ToolCalls(vec![ToolCallRequest {
                call_id: "c1".into(),
                tool: "does_not_exist".into(),
                arguments: json!({}),
            }]),
            OracleTurn::Final(json!({"answer": "recovered"})),
        ]);
        let agent = Agent::new("Solver", "instructions", answer_contract());
        let run = agent.run(&RunHistory::seeded("q"), &oracle).await.unwrap();

        match &run.new_items[1] {
            WorkItem::ToolResult {
                output, is_error, ..
            } => {
                assert!(is_error);
                assert!(output.contains("unknown tool"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }
        assert_eq!(run.final_output["answer"], "recovered");
    }

    #[tokio::test]
    async fn nonconformant_payload_is_rejected_not_coerced() {
        let oracle = ScriptedOracle::new([OracleTurn::Final(json!({"answer": 42}))]);
        let agent = Agent::new("Solver", "instructions", answer_contract());
        let err = agent
            .run(&RunHistory::seeded("q"), &oracle)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ContractViolation { .. }));
    }

    #[tokio::test]
    async fn empty_completion_is_a_fatal_no_output_error() {
        let oracle = ScriptedOracle::new([OracleTurn::Empty]);
        let agent = Agent::new("Solver", "instructions", answer_contract());
        let err = agent
            .run(&RunHistory::seeded("q"), &oracle)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::NoFinalOutput { .. }));
    }

    #[tokio::test]
    async fn runaway_tool_loop_is_cut_off() {
        let endless = std::iter::repeat_with(|| {
            OracleTurn::ToolCalls(vec![ToolCallRequest {
                call_id: "c".into(),
                tool: "echo".into(),
                arguments: json!({}),
            }])
        })
        .take(10)
        .collect::<Vec<_>>();
        let oracle = ScriptedOracle::new(endless);
        let agent = Agent::new("Solver", "instructions", answer_contract())
            .with_tool(Arc::new(EchoTool))
            .with_max_turns(3);
        let err = agent
            .run(&RunHistory::seeded("q"), &oracle)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::ToolLoopExceeded { limit: 3, .. }
        ));
    }
}
