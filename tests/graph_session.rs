use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use research_graph::models::{EdgeKey, INITIAL_COLOR};
use research_graph::{GraphError, GraphSession, ItemRecord, Message, ViewMode};

fn paper(id: &str, relevance: f64) -> ItemRecord {
    ItemRecord::new(id, &format!("Paper {id}"), "...", relevance)
}

fn scenario_two() -> GraphSession {
    let mut session = GraphSession::with_seed(42);
    session.initialize_graph(&[paper("A", 0.8)]).unwrap();
    session.merge_expansion("A", &[paper("B", 0.5)]).unwrap();
    session
}

#[test]
fn scenario_initial_graph() {
    let mut session = GraphSession::with_seed(42);
    let (nodes, edges) = session.initialize_graph(&[paper("A", 0.8)]).unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, "A");
    assert_eq!(nodes[0].size_weight, 8.0);
    assert_eq!(nodes[0].color_tag, INITIAL_COLOR);
    assert!(edges.is_empty());
}

#[test]
fn empty_search_results_are_not_an_error() {
    let mut session = GraphSession::with_seed(42);
    let (nodes, edges) = session.initialize_graph(&[]).unwrap();
    assert!(nodes.is_empty());
    assert!(edges.is_empty());
}

#[test]
fn scenario_first_expansion() {
    let mut session = GraphSession::with_seed(42);
    session.initialize_graph(&[paper("A", 0.8)]).unwrap();
    let report = session.merge_expansion("A", &[paper("B", 0.5)]).unwrap();

    assert_eq!(report.added_nodes.len(), 1);
    assert_eq!(report.added_nodes[0].size_weight, 5.0);
    assert_eq!(report.added_edges.len(), 1);
    assert_eq!(report.added_edges[0].source_id, "A");
    assert_eq!(report.added_edges[0].target_id, "B");
    assert_eq!(report.added_edges[0].weight, 0.5);
    assert_eq!(report.skipped_node_count, 0);
    assert_eq!(report.skipped_edge_count, 0);
}

#[test]
fn scenario_repeated_expansion_only_skips() {
    let mut session = scenario_two();
    let before = session.snapshot();

    let report = session.merge_expansion("A", &[paper("B", 0.5)]).unwrap();

    assert!(report.added_nodes.is_empty());
    assert!(report.added_edges.is_empty());
    assert_eq!(report.skipped_node_count, 1);
    assert_eq!(report.skipped_edge_count, 1);
    assert_eq!(session.snapshot(), before);
}

#[test]
fn scenario_reverse_edge_is_the_same_edge() {
    let mut session = scenario_two();
    let report = session.merge_expansion("B", &[paper("A", 0.9)]).unwrap();

    assert_eq!(report.skipped_node_count, 1);
    assert_eq!(report.skipped_edge_count, 1);
    assert_eq!(session.nodes().len(), 2);
    assert_eq!(session.edges().len(), 1);
    assert_eq!(session.node("A").unwrap().size_weight, 8.0);
}

#[test]
fn scenario_known_node_gets_a_new_link() {
    let mut session = scenario_two();
    let first = session.merge_expansion("A", &[paper("C", 0.6)]).unwrap();
    let second = session.merge_expansion("B", &[paper("C", 0.7)]).unwrap();

    assert_eq!(first.added_nodes.len(), 1);
    assert_eq!(second.skipped_node_count, 1);
    assert_eq!(second.added_edges.len(), 1);
    assert_eq!(second.skipped_edge_count, 0);
    assert_eq!(session.edges().len(), 3);

    // First expansion's color sticks to the node.
    assert_eq!(session.node("C").unwrap().color_tag, first.color_tag);
    assert_eq!(second.added_edges[0].color_tag, second.color_tag);
}

#[test]
fn scenario_conversation_follows_the_selected_node() {
    let mut session = scenario_two();
    session.select_node("A").unwrap();
    session.enter_conversation().unwrap();
    session.append_message("A", Message::user("Hi"));
    session.select_node("B").unwrap();

    assert_eq!(session.view_mode(), ViewMode::Conversation);
    let active = session.active_node_id().unwrap().to_string();
    assert_eq!(active, "B");
    assert!(session.history(&active).is_empty());
    assert_eq!(session.history("A").len(), 1);
}

#[test]
fn expanding_an_unknown_node_leaves_graph_unchanged() {
    let mut session = scenario_two();
    let before = session.snapshot();

    let err = session.merge_expansion("Z", &[paper("C", 0.6)]).unwrap_err();

    assert_eq!(err, GraphError::NotFound { id: "Z".into() });
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.expansions().len(), 1);
}

#[test]
fn expanding_with_nothing_is_a_no_op() {
    let mut session = scenario_two();
    let before = session.snapshot();
    let sessions_before = session.expansions().len();
    let report = session.merge_expansion("A", &[]).unwrap();

    assert_eq!(report.session_id, "");
    assert_eq!(session.expansions().len(), sessions_before);
    assert!(report.added_nodes.is_empty());
    assert!(report.added_edges.is_empty());
    assert_eq!(report.skipped_node_count, 0);
    assert_eq!(report.skipped_edge_count, 0);
    assert_eq!(session.snapshot(), before);
}

#[test]
fn closing_the_panel_keeps_context() {
    let mut session = scenario_two();
    session.select_node("A").unwrap();
    session.enter_conversation().unwrap();
    session.append_message("A", Message::user("Hi"));
    session.close_panel();

    let selection = session.selection();
    assert_eq!(selection.active_node_id.as_deref(), Some("A"));
    assert_eq!(selection.view_mode, ViewMode::Summary);
    assert!(!selection.panel_open);
    assert_eq!(session.history("A").len(), 1);

    session.reopen_panel().unwrap();
    assert_eq!(session.view_mode(), ViewMode::Conversation);
    assert_eq!(session.history("A").len(), 1);
}

const IDS: &[&str] = &["A", "B", "C", "D", "E", "F"];

fn expansion() -> impl Strategy<Value = (usize, Vec<(usize, f64)>)> {
    (
        0..IDS.len(),
        prop::collection::vec((0..IDS.len(), 0.0f64..1.0), 0..6),
    )
}

proptest! {
    #[test]
    fn merges_keep_nodes_and_edges_unique(
        initial in prop::collection::vec((0..IDS.len(), 0.0f64..1.0), 1..4),
        expansions in prop::collection::vec(expansion(), 0..12),
    ) {
        let mut session = GraphSession::with_seed(9);
        let mut first_relevance: HashMap<String, f64> = HashMap::new();

        let records: Vec<_> = initial.iter().map(|&(i, rel)| paper(IDS[i], rel)).collect();
        session.initialize_graph(&records).unwrap();
        for &(i, rel) in &initial {
            first_relevance.entry(IDS[i].to_string()).or_insert(rel);
        }

        for (source, related) in &expansions {
            let source_id = IDS[*source];
            let records: Vec<_> = related.iter().map(|&(i, rel)| paper(IDS[i], rel)).collect();
            match session.merge_expansion(source_id, &records) {
                Ok(_) => {
                    for &(i, rel) in related {
                        first_relevance.entry(IDS[i].to_string()).or_insert(rel);
                    }
                }
                Err(err) => {
                    prop_assert!(!first_relevance.contains_key(source_id));
                    prop_assert_eq!(err, GraphError::NotFound { id: source_id.to_string() });
                }
            }
        }

        let ids: HashSet<_> = session.nodes().iter().map(|n| n.id.clone()).collect();
        prop_assert_eq!(ids.len(), session.nodes().len());

        let keys: HashSet<_> = session.edges().iter().map(EdgeKey::from).collect();
        prop_assert_eq!(keys.len(), session.edges().len());
        prop_assert!(session.edges().iter().all(|e| e.source_id != e.target_id));

        for node in session.nodes() {
            prop_assert_eq!(node.size_weight, first_relevance[&node.id] * 10.0);
        }
    }

    #[test]
    fn repeating_a_merge_changes_nothing(
        related in prop::collection::vec((0..IDS.len(), 0.0f64..1.0), 0..8),
    ) {
        let mut session = GraphSession::with_seed(11);
        session.initialize_graph(&[paper("A", 0.5)]).unwrap();
        let records: Vec<_> = related.iter().map(|&(i, rel)| paper(IDS[i], rel)).collect();

        session.merge_expansion("A", &records).unwrap();
        let once = session.snapshot();
        let again = session.merge_expansion("A", &records).unwrap();

        prop_assert!(again.added_nodes.is_empty());
        prop_assert!(again.added_edges.is_empty());
        prop_assert_eq!(again.skipped_node_count, records.len());
        prop_assert_eq!(session.snapshot(), once);
    }
}
