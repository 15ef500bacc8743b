//! Nexus HR command-line entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nexus_agent::{OpenAiOracle, DEFAULT_MAX_TURNS};
use nexus_hr::config::{Neo4jConfig, OpenAiConfig};
use nexus_hr::evidence::EvidenceGateway;
use nexus_hr::graph::{CypherGateway, Neo4jStore};
use nexus_hr::workflow::Workflow;

/// Find and rank employees matching a free-text talent-search request.
#[derive(Parser, Debug)]
#[command(name = "nexus-hr", version)]
struct Args {
    /// The talent-search request, e.g. "a senior backend developer with
    /// Kafka experience and 3+ years in the order domain"
    request: String,

    /// Model identifier (overrides NEXUS_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Cap on reasoning turns per stage
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let oracle_config = OpenAiConfig::from_env()?;
    let model = args.model.unwrap_or(oracle_config.model);
    let oracle = OpenAiOracle::new(oracle_config.api_key)
        .with_base_url(oracle_config.base_url)
        .with_model(model);

    let store = Neo4jStore::connect(&Neo4jConfig::from_env()).await?;

    let workflow = Workflow::new(
        Arc::new(oracle),
        Arc::new(CypherGateway::new(Arc::new(store))),
        Arc::new(EvidenceGateway),
    )
    .with_max_turns(args.max_turns);

    let output = workflow.run(&args.request).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
