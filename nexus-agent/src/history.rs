//! Run history: the ordered transcript shared across pipeline stages.
//!
//! A [`RunHistory`] is the sole shared state of a pipeline run. Stages never
//! mutate it directly; each stage returns the items it produced and the
//! orchestrator performs the single authoritative append.

use serde::{Deserialize, Serialize};

/// One atomic unit of conversation or tool history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkItem {
    /// The raw request text that seeded the run.
    UserMessage { text: String },
    /// A stage's structured output, serialized as JSON text.
    AgentMessage { agent: String, text: String },
    /// A tool invocation requested by a stage.
    ToolCall {
        call_id: String,
        tool: String,
        arguments: serde_json::Value,
    },
    /// The outcome of a tool invocation, fed back to the requesting stage.
    ToolResult {
        call_id: String,
        tool: String,
        output: String,
        is_error: bool,
    },
}

/// Ordered, append-only sequence of [`WorkItem`]s for one pipeline run.
///
/// Monotonically growing: items are only ever appended, never removed or
/// rewritten. A failed run simply stops advancing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunHistory {
    items: Vec<WorkItem>,
}

impl RunHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history seeded with a single user message.
    pub fn seeded(request_text: impl Into<String>) -> Self {
        Self {
            items: vec![WorkItem::UserMessage {
                text: request_text.into(),
            }],
        }
    }

    /// Appends a single item.
    pub fn push(&mut self, item: WorkItem) {
        self.items.push(item);
    }

    /// Appends a stage's delta atomically.
    pub fn extend(&mut self, items: impl IntoIterator<Item = WorkItem>) {
        self.items.extend(items);
    }

    /// The items accumulated so far, in order.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
