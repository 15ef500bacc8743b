//! Pipeline orchestration.
//!
//! Drives the stage sequence Planning → FactFinding → InsightSeeking →
//! Matchmaking over one growing [`RunHistory`]. The orchestrator owns the
//! single authoritative append: every stage receives the full history so far
//! and returns a delta, which is appended atomically after the stage
//! completes. Any stage error moves the run to the absorbing `Failed` state;
//! there are no retries, no partial results and no rollback.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use nexus_agent::{Agent, AgentTool, ReasoningOracle, RunHistory};

use crate::contracts::{FactSet, InsightSet, Recommendation, TalentPlan};
use crate::evidence::EvidenceGateway;
use crate::graph::{CypherGateway, GraphStore};
use crate::stages::{fact_finder, insight_seeker, matchmaker, planner};

/// Orchestrator states. `Failed` is absorbing and reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Planning,
    FactFinding,
    InsightSeeking,
    Matchmaking,
    Done,
    Failed,
}

/// One stage's result: the raw payload text and its typed form.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput<T> {
    pub output_text: String,
    pub output_parsed: T,
}

/// Composite result of a completed run, keyed by stage.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutput {
    pub architect: StageOutput<TalentPlan>,
    pub fact_finder: StageOutput<FactSet>,
    pub insight_seeker: StageOutput<InsightSet>,
    pub matchmaker: StageOutput<Recommendation>,
}

/// The four-stage talent-search pipeline.
///
/// Holds exactly one in-flight run at a time; concurrent requests need
/// separate `Workflow` instances (each run builds its own history).
pub struct Workflow {
    oracle: Arc<dyn ReasoningOracle>,
    architect: Agent,
    fact_finder: Agent,
    insight_seeker: Agent,
    matchmaker: Agent,
}

impl Workflow {
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        graph_tool: Arc<dyn AgentTool>,
        evidence_tool: Arc<dyn AgentTool>,
    ) -> Self {
        Self {
            oracle,
            architect: planner::agent(),
            fact_finder: fact_finder::agent(graph_tool),
            insight_seeker: insight_seeker::agent(evidence_tool),
            matchmaker: matchmaker::agent(),
        }
    }

    /// Caps the oracle turns of every stage.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.architect = self.architect.with_max_turns(max_turns);
        self.fact_finder = self.fact_finder.with_max_turns(max_turns);
        self.insight_seeker = self.insight_seeker.with_max_turns(max_turns);
        self.matchmaker = self.matchmaker.with_max_turns(max_turns);
        self
    }

    /// Runs the full pipeline for one request.
    ///
    /// Blank input is rejected before the Planning stage. On failure the
    /// error names the failing stage; outputs of earlier stages are not
    /// returned.
    pub async fn run(&self, input_text: &str) -> Result<WorkflowOutput> {
        let request = input_text.trim();
        if request.is_empty() {
            bail!("request text is empty; nothing to plan");
        }
        let run_id = Uuid::new_v4();
        info!(%run_id, "starting talent-search run");
        match self.drive(request).await {
            Ok(output) => {
                info!(%run_id, state = ?PipelineState::Done, "run complete");
                Ok(output)
            }
            Err(e) => {
                error!(%run_id, state = ?PipelineState::Failed, error = %format!("{e:#}"), "run aborted");
                Err(e)
            }
        }
    }

    async fn drive(&self, request: &str) -> Result<WorkflowOutput> {
        let mut history = RunHistory::seeded(request);

        let architect: StageOutput<TalentPlan> = self
            .run_stage(PipelineState::Planning, &self.architect, &mut history, |_| {
                Ok(())
            })
            .await?;

        let fact_finder: StageOutput<FactSet> = self
            .run_stage(
                PipelineState::FactFinding,
                &self.fact_finder,
                &mut history,
                FactSet::validate,
            )
            .await?;

        let insight_seeker: StageOutput<InsightSet> = self
            .run_stage(
                PipelineState::InsightSeeking,
                &self.insight_seeker,
                &mut history,
                |insights: &InsightSet| insights.validate_against(&fact_finder.output_parsed),
            )
            .await?;

        let matchmaker: StageOutput<Recommendation> = self
            .run_stage(
                PipelineState::Matchmaking,
                &self.matchmaker,
                &mut history,
                Recommendation::validate,
            )
            .await?;

        Ok(WorkflowOutput {
            architect,
            fact_finder,
            insight_seeker,
            matchmaker,
        })
    }

    /// Invokes one stage, appends its delta, parses and checks its payload.
    async fn run_stage<T, F>(
        &self,
        state: PipelineState,
        agent: &Agent,
        history: &mut RunHistory,
        check: F,
    ) -> Result<StageOutput<T>>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> std::result::Result<(), String>,
    {
        info!(state = ?state, stage = agent.name(), history_len = history.len(), "entering stage");
        let run = agent
            .run(history, self.oracle.as_ref())
            .await
            .with_context(|| format!("stage '{}' failed", agent.name()))?;
        history.extend(run.new_items);
        let output_parsed: T = serde_json::from_value(run.final_output).with_context(|| {
            format!(
                "stage '{}' produced a payload that does not parse into its contract type",
                agent.name()
            )
        })?;
        check(&output_parsed).map_err(|reason| {
            anyhow!(
                "stage '{}' violated a cross-stage invariant: {reason}",
                agent.name()
            )
        })?;
        info!(state = ?state, stage = agent.name(), history_len = history.len(), "stage complete");
        Ok(StageOutput {
            output_text: run.output_text,
            output_parsed,
        })
    }
}

/// Sole externally callable operation of the core: wires the gateways around
/// the injected collaborators and runs one request end to end.
pub async fn run_workflow(
    input_text: &str,
    oracle: Arc<dyn ReasoningOracle>,
    store: Arc<dyn GraphStore>,
) -> Result<WorkflowOutput> {
    let workflow = Workflow::new(
        oracle,
        Arc::new(CypherGateway::new(store)),
        Arc::new(EvidenceGateway),
    );
    workflow.run(input_text).await
}
