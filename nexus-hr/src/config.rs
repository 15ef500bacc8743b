//! Environment-driven configuration.
//!
//! `.env` loading is the binary's job (see `main.rs`); this module only reads
//! the process environment.

use anyhow::{Context, Result};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Neo4j connection settings.
///
/// The defaults match a stock local Neo4j install. They are insecure and are
/// only suitable for local development; production deployments must set all
/// three variables explicitly.
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
}

impl Neo4jConfig {
    pub fn from_env() -> Self {
        Self {
            uri: env_or("NEO4J_URI", "bolt://localhost:7687"),
            username: env_or("NEO4J_USERNAME", "neo4j"),
            password: env_or("NEO4J_PASSWORD", "password"),
        }
    }
}

/// Reasoning-oracle endpoint settings. The API key has no default.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set; the reasoning oracle cannot authenticate")?;
        Ok(Self {
            api_key,
            base_url: env_or("OPENAI_BASE_URL", nexus_agent::openai::DEFAULT_BASE_URL),
            model: env_or("NEXUS_MODEL", nexus_agent::openai::DEFAULT_MODEL),
        })
    }
}
