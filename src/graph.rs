//! Result ingestion and the expansion merge engine.
//!
//! The graph only ever grows between two resets:
//!   1. `initialize` turns a flat list of search results into unconnected nodes.
//!   2. `merge_expansion` layers the related items of one source node on top,
//!      deduplicating nodes by item id and edges by their unordered endpoint pair.
//!
//! Every node and edge introduced by one merge shares a freshly drawn color.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::models::{
    EdgeKey, ExpansionRecord, GraphEdge, GraphNode, INITIAL_COLOR, Item, ItemRecord, MergeReport,
};

/// Checks every record before anything is mutated, so a malformed batch
/// never produces a partial graph.
pub fn validate_items(records: &[ItemRecord]) -> GraphResult<Vec<Item>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let item_id = match record.item_id.as_deref() {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => return Err(GraphError::Validation { index, field: "item_id" }),
            };
            let title = record
                .title
                .clone()
                .ok_or(GraphError::Validation { index, field: "title" })?;
            let summary = record
                .summary
                .clone()
                .ok_or(GraphError::Validation { index, field: "summary" })?;
            let relevance = record
                .relevance
                .ok_or(GraphError::Validation { index, field: "relevance" })?;

            Ok(Item {
                item_id,
                title,
                summary,
                relevance,
            })
        })
        .collect()
}

#[derive(Debug)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<EdgeKey>,
    expansions: Vec<ExpansionRecord>,
    rng: StdRng,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic session colors, for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            expansions: Vec::new(),
            rng,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn expansions(&self) -> &[ExpansionRecord] {
        &self.expansions
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.edge_keys.contains(&EdgeKey::new(a, b))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every node, edge and ledger entry. The RNG keeps its stream.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.edge_keys.clear();
        self.expansions.clear();
    }

    /// Replaces the whole graph with unconnected nodes built from `records`.
    /// Repeated item ids keep their first occurrence.
    pub fn initialize(
        &mut self,
        records: &[ItemRecord],
    ) -> GraphResult<(Vec<GraphNode>, Vec<GraphEdge>)> {
        let items = validate_items(records)?;

        self.clear();
        for item in &items {
            if !self.insert_node(GraphNode::from_item(item, INITIAL_COLOR)) {
                debug!("Duplicate search result ignored: {}", item.item_id);
            }
        }

        info!("Graph initialised with {} nodes", self.nodes.len());
        Ok((self.nodes.clone(), Vec::new()))
    }

    /// Merges the related items fetched for `source_id` into the graph.
    ///
    /// Node and edge dedup are checked independently: a related item that is
    /// already in the graph is not recreated, but it is still wired to
    /// `source_id` if that pair was never linked.
    pub fn merge_expansion(
        &mut self,
        source_id: &str,
        records: &[ItemRecord],
    ) -> GraphResult<MergeReport> {
        if !self.contains_node(source_id) {
            return Err(GraphError::NotFound {
                id: source_id.to_string(),
            });
        }
        let items = validate_items(records)?;
        if items.is_empty() {
            debug!("No related items for {source_id}; nothing merged");
            return Ok(MergeReport::default());
        }

        let created_at = Utc::now();
        let color_tag = self.next_session_color();
        let session_id = format!("{}-{}", created_at.timestamp_millis(), source_id);
        let mut report = MergeReport {
            session_id: session_id.clone(),
            color_tag: color_tag.clone(),
            ..MergeReport::default()
        };

        for item in &items {
            let node = GraphNode::from_item(item, &color_tag);
            if self.insert_node(node.clone()) {
                report.added_nodes.push(node);
            } else {
                report.skipped_node_count += 1;
            }

            if item.item_id == source_id {
                debug!("Self-referential related item skipped: {source_id}");
                report.skipped_edge_count += 1;
                continue;
            }

            let edge = GraphEdge {
                source_id: source_id.to_string(),
                target_id: item.item_id.clone(),
                weight: item.relevance,
                color_tag: color_tag.clone(),
            };
            if self.insert_edge(edge.clone()) {
                report.added_edges.push(edge);
            } else {
                report.skipped_edge_count += 1;
            }
        }

        self.expansions.push(ExpansionRecord {
            session_id,
            source_id: source_id.to_string(),
            color_tag: color_tag.clone(),
            created_at,
        });

        info!(
            "Expansion of {source_id} ({color_tag}): +{} nodes, +{} edges, {} nodes skipped, {} edges skipped",
            report.added_nodes.len(),
            report.added_edges.len(),
            report.skipped_node_count,
            report.skipped_edge_count
        );
        Ok(report)
    }

    fn insert_node(&mut self, node: GraphNode) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn insert_edge(&mut self, edge: GraphEdge) -> bool {
        if !self.edge_keys.insert(EdgeKey::from(&edge)) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Random `#rrggbb`, never equal to the initial-result color.
    fn next_session_color(&mut self) -> String {
        loop {
            let value: u32 = self.rng.gen_range(0..=0xFF_FFFF);
            let color = format!("#{value:06x}");
            if color != INITIAL_COLOR {
                return color;
            }
        }
    }
}
