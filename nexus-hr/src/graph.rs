//! Structured-query gateway to the employee graph.
//!
//! The store is injected behind [`GraphStore`] so the pipeline can run
//! against a test double, and so the Neo4j client handle is an explicitly
//! owned resource rather than process-global state. [`CypherGateway`] is the
//! tool surface the Fact-Finder stage invokes: whatever goes wrong below it
//! (connectivity, syntax, timeout), the stage gets readable failure text
//! back, never a hard error.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use nexus_agent::{AgentTool, ToolOutput, ToolSpec};

use crate::config::Neo4jConfig;

/// Fixed marker prefixing every failure string returned through the tool.
pub const QUERY_FAILURE_PREFIX: &str = "Query execution failed:";

/// Narrow query/execute seam over the graph store.
///
/// Implementations return one JSON object per result row: a mapping from
/// returned field name to a plain value, with store-native numeric wrappers
/// unwrapped and node values flattened to their property maps.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn run_query(&self, cypher: &str) -> Result<Vec<Value>>;
}

/// Neo4j-backed [`GraphStore`]. Holds one driver handle for its lifetime;
/// each query acquires and releases a connection from the driver's pool.
pub struct Neo4jStore {
    graph: neo4rs::Graph,
}

impl Neo4jStore {
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let graph = neo4rs::Graph::new(
            config.uri.as_str(),
            config.username.as_str(),
            config.password.as_str(),
        )
            .await
            .with_context(|| format!("failed to connect to Neo4j at {}", config.uri))?;
        Ok(Self { graph })
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn run_query(&self, cypher: &str) -> Result<Vec<Value>> {
        let mut stream = self
            .graph
            .execute(neo4rs::query(cypher))
            .await
            .map_err(|e| anyhow!("query rejected by store: {e}"))?;
        let mut records = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| anyhow!("result streaming failed: {e}"))?
        {
            // Deserializing through serde unwraps Neo4j integer wrappers to
            // plain numbers and flattens nodes to their property maps;
            // internal ids and labels are dropped.
            let fields: BTreeMap<String, Value> = row
                .to()
                .map_err(|e| anyhow!("result row could not be converted: {e}"))?;
            records.push(Value::Object(fields.into_iter().collect()));
        }
        Ok(records)
    }
}

/// Tool surface for executing Cypher generated by the Fact-Finder stage.
pub struct CypherGateway {
    store: Arc<dyn GraphStore>,
}

impl CypherGateway {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AgentTool for CypherGateway {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "execute_cypher_query".into(),
            description:
                "Executes a Cypher query against the employee graph and returns the matching \
                 records as a JSON array."
                    .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Cypher query to run"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, arguments: Value) -> ToolOutput {
        let Some(cypher) = arguments.get("query").and_then(Value::as_str) else {
            return ToolOutput::error(format!(
                "{QUERY_FAILURE_PREFIX} missing required argument 'query'"
            ));
        };
        debug!(%cypher, "executing cypher query");
        match self.store.run_query(cypher).await {
            Ok(records) => match serde_json::to_string_pretty(&records) {
                Ok(text) => ToolOutput::text(text),
                Err(e) => ToolOutput::error(format!("{QUERY_FAILURE_PREFIX} {e}")),
            },
            Err(e) => {
                warn!(error = %e, "cypher query failed");
                ToolOutput::error(format!("{QUERY_FAILURE_PREFIX} {e:#}"))
            }
        }
    }
}
