//! `GraphSession`: the single owner of graph, selection and transcripts for
//! one browsing session. Consumers read through snapshots; every mutation
//! goes through the methods below.

use tracing::info;

use crate::conversation::{format_context, ConversationLog};
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::models::{
    ExpansionRecord, GraphEdge, GraphNode, GraphSnapshot, ItemRecord, MergeReport, Message,
    SelectionSnapshot, ViewMode,
};
use crate::selection::Selection;

#[derive(Debug, Default)]
pub struct GraphSession {
    graph: Graph,
    selection: Selection,
    conversations: ConversationLog,
    generation: u64,
}

impl GraphSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            graph: Graph::with_seed(seed),
            ..Self::default()
        }
    }

    /// Builds the first graph after a reset. Clears the selection, since the
    /// previous active node may not exist anymore.
    pub fn initialize_graph(
        &mut self,
        items: &[ItemRecord],
    ) -> GraphResult<(Vec<GraphNode>, Vec<GraphEdge>)> {
        let result = self.graph.initialize(items)?;
        self.selection.clear();
        Ok(result)
    }

    pub fn merge_expansion(
        &mut self,
        source_node_id: &str,
        related_items: &[ItemRecord],
    ) -> GraphResult<MergeReport> {
        self.graph.merge_expansion(source_node_id, related_items)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        self.graph.edges()
    }

    pub fn expansions(&self) -> &[ExpansionRecord] {
        self.graph.expansions()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph.node(id)
    }

    pub fn select_node(&mut self, id: &str) -> GraphResult<()> {
        self.select_node_with_mode(id, None)
    }

    pub fn select_node_with_mode(&mut self, id: &str, mode: Option<ViewMode>) -> GraphResult<()> {
        if !self.graph.contains_node(id) {
            return Err(GraphError::NotFound { id: id.to_string() });
        }
        self.selection.select(id, mode)
    }

    pub fn enter_conversation(&mut self) -> GraphResult<()> {
        self.selection.enter_conversation()
    }

    pub fn close_panel(&mut self) {
        self.selection.close_panel();
    }

    pub fn reopen_panel(&mut self) -> GraphResult<()> {
        self.selection.reopen_panel()
    }

    pub fn active_node_id(&self) -> Option<&str> {
        self.selection.active_node_id()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.selection.view_mode()
    }

    pub fn selection(&self) -> SelectionSnapshot {
        self.selection.snapshot()
    }

    pub fn append_message(&mut self, node_id: &str, message: Message) {
        self.conversations.append(node_id, message);
    }

    pub fn history(&self, node_id: &str) -> &[Message] {
        self.conversations.history(node_id)
    }

    /// Transcript of `node_id` formatted for a related-items request, or
    /// `None` when there is nothing to send.
    pub fn expansion_context(&self, node_id: &str) -> Option<String> {
        let history = self.conversations.history(node_id);
        (!history.is_empty()).then(|| format_context(history))
    }

    /// Back to the pre-search state. The only way transcripts are dropped.
    pub fn full_reset(&mut self) {
        self.graph.clear();
        self.selection.clear();
        self.conversations.clear();
        self.generation += 1;
        info!("Session reset (generation {})", self.generation);
    }

    /// Bumped by every `full_reset`. Callers awaiting the backend compare it
    /// before writing a late answer back.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.nodes().to_vec(),
            edges: self.graph.edges().to_vec(),
            selection: self.selection.snapshot(),
        }
    }
}
