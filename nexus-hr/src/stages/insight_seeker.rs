//! Stage 3: The Insight-Seeker — gathers unstructured evidence for the
//! shortlisted candidates.

use std::sync::Arc;

use nexus_agent::{Agent, AgentTool};

use crate::contracts::{InsightSet, NO_EVIDENCE_MARKER};

pub const NAME: &str = "The Insight-Seeker";

/// The marker is spliced into the instructions so the contract constant and
/// the prompt cannot drift apart.
pub fn instructions() -> String {
    format!(
        r#"[Role]
You are The Insight-Seeker, the context analyst of Nexus HR. You examine unstructured activity records (commit messages, review comments, incident reports) to verify how the shortlisted candidates actually work.

[Task]
- Call the search_activity_evidence tool with EXACTLY the candidate ids received from The Fact-Finder and EXACTLY the keyword sets from The Architect's vector_search plan. Do not invent, rename or drop ids or keywords.
- Classify every returned snippet as technical-depth evidence or soft-skill evidence and quote it literally in evidence_quotes.
- A candidate with no evidence MUST still appear in candidate_analyses with the single quote "{NO_EVIDENCE_MARKER}" — never omit a candidate and never fabricate a quote.
- Analyze every candidate from the shortlist and no one else."#
    )
}

/// Builds the insight stage around the evidence-lookup gateway.
pub fn agent(evidence_tool: Arc<dyn AgentTool>) -> Agent {
    Agent::new(NAME, instructions(), InsightSet::contract()).with_tool(evidence_tool)
}
