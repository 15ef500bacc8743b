//! Evidence-lookup gateway.
//!
//! Stand-in for the vector similarity search over activity logs, which lives
//! upstream and is not yet connected. The tool honors the real contract
//! (candidate ids + keyword hints in, JSON evidence out) but only echoes what
//! would have been searched, so the Insight-Seeker stage can already exercise
//! the full protocol and must record explicit absence-of-evidence markers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use nexus_agent::{AgentTool, ToolOutput, ToolSpec};

#[derive(Debug, Deserialize)]
struct EvidenceQuery {
    candidate_ids: Vec<String>,
    query_keywords: Vec<String>,
    top_k: u32,
}

/// Stub implementation of the evidence interface.
pub struct EvidenceGateway;

#[async_trait]
impl AgentTool for EvidenceGateway {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "search_activity_evidence".into(),
            description:
                "Searches unstructured activity logs (commit messages, review comments, incident \
                 reports) for evidence about the given candidates."
                    .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "candidate_ids": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Employee ids from the Fact-Finder's shortlist"
                    },
                    "query_keywords": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Keyword hints from the search plan"
                    },
                    "top_k": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum evidence snippets per candidate"
                    }
                },
                "required": ["candidate_ids", "query_keywords", "top_k"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, arguments: Value) -> ToolOutput {
        let query: EvidenceQuery = match serde_json::from_value(arguments) {
            Ok(query) => query,
            Err(e) => return ToolOutput::error(format!("invalid evidence query: {e}")),
        };
        debug!(
            candidates = query.candidate_ids.len(),
            keywords = query.query_keywords.len(),
            top_k = query.top_k,
            "evidence lookup requested (stub)"
        );
        let body = json!({
            "status": "not_implemented",
            "detail": "vector evidence search is not connected; no activity records were searched",
            "searched_candidates": query.candidate_ids,
            "query_keywords": query.query_keywords,
            "top_k": query.top_k,
            "results": [],
        });
        match serde_json::to_string_pretty(&body) {
            Ok(text) => ToolOutput::text(text),
            Err(e) => ToolOutput::error(format!("evidence lookup failed: {e}")),
        }
    }
}
