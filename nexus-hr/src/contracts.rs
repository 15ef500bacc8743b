//! The four stage contracts: the inter-stage wire format.
//!
//! Each stage must emit exactly one payload conforming to its contract. The
//! schemas here are what the oracle is held to (strict validation, no
//! coercion); the structs are what the orchestrator works with after parsing.
//! Cross-stage invariants that a single schema cannot express (candidate cap,
//! referential integrity, rank ordering) live in the `validate` methods.

use serde::{Deserialize, Serialize};
use serde_json::json;

use nexus_agent::OutputContract;

/// Fixed cap on the Fact-Finder's candidate list.
pub const MAX_CANDIDATES: usize = 5;

/// Marker the Insight-Seeker must record for a candidate with no evidence,
/// instead of omitting the candidate or inventing quotes.
pub const NO_EVIDENCE_MARKER: &str = "NO_EVIDENCE_FOUND";

/// Extracts the leading integer from a free-text requirement such as
/// "3 years", "3+ years in payments" or "at least 10 years".
pub fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// ---------------------------------------------------------------------------
// The Architect
// ---------------------------------------------------------------------------

/// Structured-search half of the plan: fact-based filtering over the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFilter {
    pub target_skills: Vec<String>,
    pub target_domain: String,
    /// Free text, e.g. "3+ years"; see [`GraphFilter::min_experience_years`].
    pub min_experience: String,
    pub project_keywords: Vec<String>,
}

impl GraphFilter {
    /// Numeric experience threshold parsed out of `min_experience`.
    pub fn min_experience_years(&self) -> Option<u32> {
        leading_integer(&self.min_experience)
    }
}

/// Unstructured-search half of the plan: context-based evidence retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchPlan {
    pub technical_depth_keywords: Vec<String>,
    pub soft_skill_keywords: Vec<String>,
    pub evidence_to_find: String,
}

/// The Architect's output: the search strategy for the downstream stages.
/// Both halves are always present, even if empty — downstream stages depend
/// on both existing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalentPlan {
    pub reasoning: String,
    pub graph_filter: GraphFilter,
    pub vector_search: VectorSearchPlan,
}

impl TalentPlan {
    pub fn contract() -> OutputContract {
        OutputContract::new(
            "talent_plan",
            json!({
                "type": "object",
                "properties": {
                    "reasoning": {"type": "string"},
                    "graph_filter": {
                        "type": "object",
                        "properties": {
                            "target_skills": {"type": "array", "items": {"type": "string"}},
                            "target_domain": {"type": "string"},
                            "min_experience": {"type": "string"},
                            "project_keywords": {"type": "array", "items": {"type": "string"}}
                        },
                        "required": ["target_skills", "target_domain", "min_experience", "project_keywords"],
                        "additionalProperties": false
                    },
                    "vector_search": {
                        "type": "object",
                        "properties": {
                            "technical_depth_keywords": {"type": "array", "items": {"type": "string"}},
                            "soft_skill_keywords": {"type": "array", "items": {"type": "string"}},
                            "evidence_to_find": {"type": "string"}
                        },
                        "required": ["technical_depth_keywords", "soft_skill_keywords", "evidence_to_find"],
                        "additionalProperties": false
                    }
                },
                "required": ["reasoning", "graph_filter", "vector_search"],
                "additionalProperties": false
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// The Fact-Finder
// ---------------------------------------------------------------------------

/// One candidate pulled from the graph. `id` is the stable key later stages
/// use for evidence lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub position: String,
    pub exp_years: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_projects: Option<Vec<String>>,
}

/// The Fact-Finder's output: the query it actually ran and the shortlist it
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    /// The Cypher query that was executed (not merely planned).
    pub executed_query: String,
    pub reasoning: String,
    pub candidates: Vec<Candidate>,
    /// What the Insight-Seeker should focus on for these candidates.
    pub next_step_instructions: String,
}

impl FactSet {
    pub fn contract() -> OutputContract {
        OutputContract::new(
            "fact_set",
            json!({
                "type": "object",
                "properties": {
                    "executed_query": {"type": "string"},
                    "reasoning": {"type": "string"},
                    "candidates": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "name": {"type": "string"},
                                "position": {"type": "string"},
                                "exp_years": {"type": "number"},
                                "matched_projects": {
                                    "type": ["array", "null"],
                                    "items": {"type": "string"}
                                }
                            },
                            "required": ["id", "name", "position", "exp_years", "matched_projects"],
                            "additionalProperties": false
                        }
                    },
                    "next_step_instructions": {"type": "string"}
                },
                "required": ["executed_query", "reasoning", "candidates", "next_step_instructions"],
                "additionalProperties": false
            }),
        )
    }

    /// Checks the invariants the schema cannot express: the fixed result cap
    /// and id uniqueness.
    pub fn validate(&self) -> Result<(), String> {
        if self.candidates.len() > MAX_CANDIDATES {
            return Err(format!(
                "{} candidates returned, cap is {MAX_CANDIDATES}",
                self.candidates.len()
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for candidate in &self.candidates {
            if !seen.insert(candidate.id.as_str()) {
                return Err(format!("duplicate candidate id '{}'", candidate.id));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// The Insight-Seeker
// ---------------------------------------------------------------------------

/// Per-candidate evidence analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInsight {
    /// Must reference a [`Candidate::id`] from the Fact-Finder's shortlist.
    pub id: String,
    pub technical_depth: String,
    pub soft_skill_analysis: String,
    /// Literal snippets from activity records, or [`NO_EVIDENCE_MARKER`].
    pub evidence_quotes: Vec<String>,
}

impl CandidateInsight {
    /// True when this analysis records an explicit absence of evidence.
    pub fn has_no_evidence(&self) -> bool {
        self.evidence_quotes.is_empty()
            || self
                .evidence_quotes
                .iter()
                .all(|quote| quote == NO_EVIDENCE_MARKER)
    }
}

/// The Insight-Seeker's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSet {
    pub candidate_analyses: Vec<CandidateInsight>,
}

impl InsightSet {
    pub fn contract() -> OutputContract {
        OutputContract::new(
            "insight_set",
            json!({
                "type": "object",
                "properties": {
                    "candidate_analyses": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "technical_depth": {"type": "string"},
                                "soft_skill_analysis": {"type": "string"},
                                "evidence_quotes": {"type": "array", "items": {"type": "string"}}
                            },
                            "required": ["id", "technical_depth", "soft_skill_analysis", "evidence_quotes"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["candidate_analyses"],
                "additionalProperties": false
            }),
        )
    }

    /// Enforces referential integrity against the Fact-Finder's shortlist:
    /// no dangling ids, exactly one analysis per candidate, and no candidate
    /// silently omitted — a candidate with no evidence must still appear,
    /// carrying the absence marker.
    pub fn validate_against(&self, facts: &FactSet) -> Result<(), String> {
        let known: std::collections::HashSet<&str> =
            facts.candidates.iter().map(|c| c.id.as_str()).collect();
        let mut analyzed = std::collections::HashSet::new();
        for analysis in &self.candidate_analyses {
            if !known.contains(analysis.id.as_str()) {
                return Err(format!(
                    "analysis references unknown candidate id '{}'",
                    analysis.id
                ));
            }
            if !analyzed.insert(analysis.id.as_str()) {
                return Err(format!(
                    "duplicate analysis for candidate id '{}'",
                    analysis.id
                ));
            }
        }
        for candidate in &facts.candidates {
            if !analyzed.contains(candidate.id.as_str()) {
                return Err(format!(
                    "candidate '{}' was omitted; record '{NO_EVIDENCE_MARKER}' instead",
                    candidate.id
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// The Matchmaker
// ---------------------------------------------------------------------------

/// One ranked entry in the final recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// 1-based position, consistent with descending `match_score` order.
    pub rank: u32,
    pub name: String,
    /// Weighted score in 0–100: 40% stack/domain fit, 40% problem-solving
    /// evidence concreteness, 20% collaboration fit.
    pub match_score: f64,
    pub summary_justification: String,
    pub technical_proof: String,
    pub collaboration_proof: String,
}

/// The Matchmaker's output: the final, evidence-backed ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub final_recommendation: Vec<RankedCandidate>,
    pub overall_conclusion: String,
}

impl Recommendation {
    pub fn contract() -> OutputContract {
        OutputContract::new(
            "recommendation",
            json!({
                "type": "object",
                "properties": {
                    "final_recommendation": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "rank": {"type": "integer", "minimum": 1},
                                "name": {"type": "string"},
                                "match_score": {"type": "number", "minimum": 0, "maximum": 100},
                                "summary_justification": {"type": "string"},
                                "technical_proof": {"type": "string"},
                                "collaboration_proof": {"type": "string"}
                            },
                            "required": ["rank", "name", "match_score", "summary_justification", "technical_proof", "collaboration_proof"],
                            "additionalProperties": false
                        }
                    },
                    "overall_conclusion": {"type": "string"}
                },
                "required": ["final_recommendation", "overall_conclusion"],
                "additionalProperties": false
            }),
        )
    }

    /// Enforces the ordering the stage instructions demand: scores within
    /// 0–100, non-increasing, and `rank` equal to the 1-based position.
    pub fn validate(&self) -> Result<(), String> {
        let mut previous: Option<f64> = None;
        for (index, entry) in self.final_recommendation.iter().enumerate() {
            if !(0.0..=100.0).contains(&entry.match_score) {
                return Err(format!(
                    "match_score {} for '{}' is outside 0-100",
                    entry.match_score, entry.name
                ));
            }
            if let Some(prev) = previous {
                if entry.match_score > prev {
                    return Err(format!(
                        "recommendation not sorted by descending score at '{}'",
                        entry.name
                    ));
                }
            }
            let expected = (index + 1) as u32;
            if entry.rank != expected {
                return Err(format!(
                    "rank {} for '{}' does not match position {expected}",
                    entry.rank, entry.name
                ));
            }
            previous = Some(entry.match_score);
        }
        Ok(())
    }
}
