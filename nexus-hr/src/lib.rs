//! Nexus HR: a four-stage talent-search pipeline.
//!
//! A free-text request is decomposed by The Architect, grounded in the
//! employee graph by The Fact-Finder, backed with unstructured evidence by
//! The Insight-Seeker, and synthesized into a ranked recommendation by The
//! Matchmaker. Stage contracts, gateways and orchestration live here; the
//! generic agent runtime lives in the `nexus-agent` crate.

pub mod config;
pub mod contracts;
pub mod evidence;
pub mod graph;
pub mod stages;
pub mod workflow;

pub use config::{Neo4jConfig, OpenAiConfig};
pub use contracts::{
    Candidate, CandidateInsight, FactSet, GraphFilter, InsightSet, RankedCandidate,
    Recommendation, TalentPlan, VectorSearchPlan, MAX_CANDIDATES, NO_EVIDENCE_MARKER,
};
pub use evidence::EvidenceGateway;
pub use graph::{CypherGateway, GraphStore, Neo4jStore, QUERY_FAILURE_PREFIX};
pub use workflow::{run_workflow, PipelineState, StageOutput, Workflow, WorkflowOutput};
