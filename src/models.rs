//! Domain models: retrieval items, graph nodes and edges, chat messages and
//! the read-only snapshots handed to the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color of nodes created from the initial search results. Never produced
/// by an expansion session.
pub const INITIAL_COLOR: &str = "#9e9e9e";

/// Raw item as delivered by the retrieval backend, before validation.
/// Any field may be missing; ingestion reports which one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub relevance: Option<f64>,
}

impl ItemRecord {
    pub fn new(item_id: &str, title: &str, summary: &str, relevance: f64) -> Self {
        Self {
            item_id: Some(item_id.to_string()),
            title: Some(title.to_string()),
            summary: Some(summary.to_string()),
            relevance: Some(relevance),
        }
    }
}

/// A validated research artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub title: String,
    pub summary: String,
    pub relevance: f64,
}

/// One item inside the graph. `size_weight` and `color_tag` are snapshots
/// taken when the node was first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub detail: String,
    pub size_weight: f64,
    pub color_tag: String,
}

impl GraphNode {
    pub fn from_item(item: &Item, color_tag: &str) -> Self {
        Self {
            id: item.item_id.clone(),
            label: item.title.clone(),
            detail: item.summary.clone(),
            size_weight: item.relevance * 10.0,
            color_tag: color_tag.to_string(),
        }
    }
}

/// Undirected relationship created by an expansion. `source_id` is the node
/// that was expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_id: String,
    pub target_id: String,
    pub weight: f64,
    pub color_tag: String,
}

/// Order-independent identity of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey(String, String);

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

impl From<&GraphEdge> for EdgeKey {
    fn from(edge: &GraphEdge) -> Self {
        EdgeKey::new(&edge.source_id, &edge.target_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::now(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::now(Speaker::Assistant, text)
    }

    fn now(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Summary,
    Detail,
    Conversation,
}

/// Bookkeeping entry for one expansion merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionRecord {
    pub session_id: String,
    pub source_id: String,
    pub color_tag: String,
    pub created_at: DateTime<Utc>,
}

/// What a single `merge_expansion` call changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub session_id: String,
    pub color_tag: String,
    pub added_nodes: Vec<GraphNode>,
    pub added_edges: Vec<GraphEdge>,
    pub skipped_node_count: usize,
    pub skipped_edge_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub active_node_id: Option<String>,
    pub view_mode: ViewMode,
    pub panel_open: bool,
}

/// Everything the renderer and the panels read in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(flatten)]
    pub selection: SelectionSnapshot,
}
