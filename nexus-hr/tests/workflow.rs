//! End-to-end pipeline tests driven by a scripted oracle and an in-memory
//! graph store.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use nexus_agent::testing::ScriptedOracle;
use nexus_agent::{OracleTurn, ToolCallRequest};
use nexus_hr::contracts::NO_EVIDENCE_MARKER;
use nexus_hr::evidence::EvidenceGateway;
use nexus_hr::graph::{CypherGateway, GraphStore, QUERY_FAILURE_PREFIX};
use nexus_hr::workflow::Workflow;

struct FixedStore {
    records: Vec<Value>,
}

#[async_trait]
impl GraphStore for FixedStore {
    async fn run_query(&self, _cypher: &str) -> Result<Vec<Value>> {
        Ok(self.records.clone())
    }
}

struct FailingStore;

#[async_trait]
impl GraphStore for FailingStore {
    async fn run_query(&self, _cypher: &str) -> Result<Vec<Value>> {
        Err(anyhow::anyhow!("deadline exceeded"))
    }
}

fn workflow(oracle: Arc<ScriptedOracle>, store: Arc<dyn GraphStore>) -> Workflow {
    Workflow::new(
        oracle,
        Arc::new(CypherGateway::new(store)),
        Arc::new(EvidenceGateway),
    )
}

fn employee_store() -> Arc<dyn GraphStore> {
    Arc::new(FixedStore {
        records: vec![
            json!({"id": "e-101", "name": "Kim", "position": "Senior Backend", "exp_years": 6}),
            json!({"id": "e-102", "name": "Lee", "position": "Senior Backend", "exp_years": 4}),
        ],
    })
}

fn plan_turn() -> OracleTurn {
    OracleTurn::Final(json!({
        "reasoning": "Kafka plus order domain: verify depth via lag and partitioning work",
        "graph_filter": {
            "target_skills": ["Kafka"],
            "target_domain": "Order",
            "min_experience": "3 years",
            "project_keywords": ["order-pipeline"]
        },
        "vector_search": {
            "technical_depth_keywords": ["Consumer Lag", "Partitioning", "Throughput"],
            "soft_skill_keywords": ["incident communication", "documentation"],
            "evidence_to_find": "hands-on Kafka problem solving in the order domain"
        }
    }))
}

const EXECUTED_QUERY: &str = "MATCH (e:Employee)-[:HAS_SKILL]->(s:Skill {name: 'Kafka'}), \
     (e)-[:WORKED_ON]->(p:Project)-[:IN_DOMAIN]->(d:Domain) \
     WHERE d.name CONTAINS 'Order' AND e.exp_years >= 3 \
     RETURN e.id AS id, e.name AS name, e.position AS position, e.exp_years AS exp_years \
     LIMIT 5";

fn cypher_call_turn() -> OracleTurn {
    OracleTurn::ToolCalls(vec![ToolCallRequest {
        call_id: "call-cypher-1".into(),
        tool: "execute_cypher_query".into(),
        arguments: json!({"query": EXECUTED_QUERY}),
    }])
}

fn fact_turn(candidates: Value) -> OracleTurn {
    OracleTurn::Final(json!({
        "executed_query": EXECUTED_QUERY,
        "reasoning": "two employees match skill, domain and threshold",
        "candidates": candidates,
        "next_step_instructions": "inspect Kafka incident logs for both candidates"
    }))
}

fn default_candidates() -> Value {
    json!([
        {"id": "e-101", "name": "Kim", "position": "Senior Backend", "exp_years": 6.0,
         "matched_projects": ["order-pipeline"]},
        {"id": "e-102", "name": "Lee", "position": "Senior Backend", "exp_years": 4.0,
         "matched_projects": null}
    ])
}

fn evidence_call_turn() -> OracleTurn {
    OracleTurn::ToolCalls(vec![ToolCallRequest {
        call_id: "call-evidence-1".into(),
        tool: "search_activity_evidence".into(),
        arguments: json!({
            "candidate_ids": ["e-101", "e-102"],
            "query_keywords": ["Consumer Lag", "Partitioning", "Throughput",
                               "incident communication", "documentation"],
            "top_k": 5
        }),
    }])
}

fn insight_turn(analyses: Value) -> OracleTurn {
    OracleTurn::Final(json!({ "candidate_analyses": analyses }))
}

fn default_analyses() -> Value {
    json!([
        {
            "id": "e-101",
            "technical_depth": "resolved sustained consumer lag under load",
            "soft_skill_analysis": "writes clear incident reports",
            "evidence_quotes": ["\"cut consumer lag from 2M to 5k by rebalancing partitions\""]
        },
        {
            "id": "e-102",
            "technical_depth": "no activity records found",
            "soft_skill_analysis": "no activity records found",
            "evidence_quotes": [NO_EVIDENCE_MARKER]
        }
    ])
}

fn recommendation_turn() -> OracleTurn {
    OracleTurn::Final(json!({
        "final_recommendation": [
            {
                "rank": 1,
                "name": "Kim",
                "match_score": 88.0,
                "summary_justification": "stack fit corroborated by concrete lag work",
                "technical_proof": "\"cut consumer lag from 2M to 5k by rebalancing partitions\"",
                "collaboration_proof": "\"writes clear incident reports\""
            },
            {
                "rank": 2,
                "name": "Lee",
                "match_score": 54.0,
                "summary_justification": "credentials match but nothing corroborates them",
                "technical_proof": NO_EVIDENCE_MARKER,
                "collaboration_proof": NO_EVIDENCE_MARKER
            }
        ],
        "overall_conclusion": "Kim is the evidence-backed first choice"
    }))
}

const REQUEST: &str = "a senior backend developer with Kafka experience and 3+ years in the order domain";

#[tokio::test]
async fn full_pipeline_produces_ranked_recommendation() {
    let oracle = Arc::new(ScriptedOracle::new([
        plan_turn(),
        cypher_call_turn(),
        fact_turn(default_candidates()),
        evidence_call_turn(),
        insight_turn(default_analyses()),
        recommendation_turn(),
    ]));
    let output = workflow(oracle.clone(), employee_store())
        .run(REQUEST)
        .await
        .unwrap();

    // Stages ran in order; tool turns invoke the oracle twice per stage.
    assert_eq!(
        oracle.agents_invoked(),
        vec![
            "The Architect",
            "The Fact-Finder",
            "The Fact-Finder",
            "The Insight-Seeker",
            "The Insight-Seeker",
            "The Matchmaker",
        ]
    );

    let plan = &output.architect.output_parsed;
    assert!(plan.graph_filter.target_skills.contains(&"Kafka".to_string()));
    assert!(plan
        .vector_search
        .technical_depth_keywords
        .contains(&"Consumer Lag".to_string()));
    assert_eq!(plan.graph_filter.min_experience_years(), Some(3));

    let facts = &output.fact_finder.output_parsed;
    assert!(facts.candidates.len() <= 5);
    assert!(facts.executed_query.contains("LIMIT 5"));
    assert!(facts.executed_query.contains("e.exp_years >= 3"));

    let insights = &output.insight_seeker.output_parsed;
    let lee = insights
        .candidate_analyses
        .iter()
        .find(|a| a.id == "e-102")
        .unwrap();
    assert!(lee.has_no_evidence());

    let recommendation = &output.matchmaker.output_parsed;
    let scores: Vec<f64> = recommendation
        .final_recommendation
        .iter()
        .map(|r| r.match_score)
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    for (index, entry) in recommendation.final_recommendation.iter().enumerate() {
        assert_eq!(entry.rank as usize, index + 1);
    }
    // The evidence-free candidate only cites the absence marker.
    assert_eq!(
        recommendation.final_recommendation[1].technical_proof,
        NO_EVIDENCE_MARKER
    );
}

#[tokio::test]
async fn blank_input_is_rejected_before_planning() {
    let oracle = Arc::new(ScriptedOracle::new([]));
    let err = workflow(oracle.clone(), employee_store())
        .run("   ")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("empty"));
    assert!(oracle.agents_invoked().is_empty());
}

#[tokio::test]
async fn failed_store_query_does_not_crash_the_stage() {
    // The gateway reports the failure as text; the oracle reads it and still
    // finalizes a (sparse) fact set.
    let oracle = Arc::new(ScriptedOracle::new([
        plan_turn(),
        cypher_call_turn(),
        fact_turn(json!([])),
        evidence_call_turn(),
        insight_turn(json!([])),
        recommendation_turn_empty(),
    ]));
    let output = workflow(oracle, Arc::new(FailingStore))
        .run(REQUEST)
        .await
        .unwrap();
    assert!(output.fact_finder.output_parsed.candidates.is_empty());
}

fn recommendation_turn_empty() -> OracleTurn {
    OracleTurn::Final(json!({
        "final_recommendation": [],
        "overall_conclusion": "no candidates matched the filter"
    }))
}

#[tokio::test]
async fn gateway_failure_text_carries_the_marker() {
    let gateway = CypherGateway::new(Arc::new(FailingStore));
    let output = nexus_agent::AgentTool::invoke(&gateway, json!({"query": "RETURN 1"})).await;
    assert!(output.is_error);
    assert!(output.content.starts_with(QUERY_FAILURE_PREFIX));
}

#[tokio::test]
async fn oversized_candidate_list_fails_the_fact_finding_stage() {
    let six: Vec<Value> = (0..6)
        .map(|i| {
            json!({
                "id": format!("e-{i}"),
                "name": format!("Employee {i}"),
                "position": "Backend",
                "exp_years": 5.0,
                "matched_projects": null
            })
        })
        .collect();
    let oracle = Arc::new(ScriptedOracle::new([
        plan_turn(),
        fact_turn(Value::Array(six)),
    ]));
    let err = workflow(oracle, employee_store())
        .run(REQUEST)
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("The Fact-Finder"));
    assert!(message.contains("cap is 5"));
}

#[tokio::test]
async fn dangling_insight_id_fails_the_insight_stage() {
    let oracle = Arc::new(ScriptedOracle::new([
        plan_turn(),
        fact_turn(default_candidates()),
        insight_turn(json!([
            {
                "id": "ghost-1",
                "technical_depth": "",
                "soft_skill_analysis": "",
                "evidence_quotes": [NO_EVIDENCE_MARKER]
            }
        ])),
    ]));
    let err = workflow(oracle, employee_store())
        .run(REQUEST)
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("The Insight-Seeker"));
    assert!(message.contains("unknown candidate"));
}

#[tokio::test]
async fn unsorted_recommendation_fails_the_matchmaking_stage() {
    let unsorted = OracleTurn::Final(json!({
        "final_recommendation": [
            {
                "rank": 1, "name": "Lee", "match_score": 40.0,
                "summary_justification": "", "technical_proof": "", "collaboration_proof": ""
            },
            {
                "rank": 2, "name": "Kim", "match_score": 90.0,
                "summary_justification": "", "technical_proof": "", "collaboration_proof": ""
            }
        ],
        "overall_conclusion": ""
    }));
    let oracle = Arc::new(ScriptedOracle::new([
        plan_turn(),
        fact_turn(default_candidates()),
        insight_turn(default_analyses()),
        unsorted,
    ]));
    let err = workflow(oracle, employee_store())
        .run(REQUEST)
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("The Matchmaker"));
    assert!(message.contains("not sorted"));
}

#[tokio::test]
async fn empty_stage_completion_aborts_the_run_naming_the_stage() {
    let oracle = Arc::new(ScriptedOracle::new([plan_turn(), OracleTurn::Empty]));
    let err = workflow(oracle, employee_store())
        .run(REQUEST)
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("The Fact-Finder"));
    assert!(message.contains("without a final output"));
}
