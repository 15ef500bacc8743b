//! Test doubles for driving agents without a live model.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::oracle::{OracleRequest, OracleTurn, ReasoningOracle};

/// Oracle that replays a fixed sequence of turns, regardless of input.
///
/// Also records which agent asked for each turn, so tests can assert stage
/// ordering across a pipeline run.
pub struct ScriptedOracle {
    turns: Mutex<VecDeque<OracleTurn>>,
    invoked: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(turns: impl IntoIterator<Item = OracleTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            invoked: Mutex::new(Vec::new()),
        }
    }

    /// Names of the agents that invoked the oracle, in call order.
    pub fn agents_invoked(&self) -> Vec<String> {
        match self.invoked.lock() {
            Ok(invoked) => invoked.clone(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl ReasoningOracle for ScriptedOracle {
    async fn complete(&self, request: OracleRequest<'_>) -> Result<OracleTurn> {
        if let Ok(mut invoked) = self.invoked.lock() {
            invoked.push(request.agent.to_string());
        }
        let mut turns = self
            .turns
            .lock()
            .map_err(|_| AgentError::Oracle("scripted oracle lock poisoned".into()))?;
        turns
            .pop_front()
            .ok_or_else(|| AgentError::Oracle("scripted oracle ran out of turns".into()))
    }
}
