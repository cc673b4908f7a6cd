//! Selection and view-mode state machine.
//!
//! `Summary` is the resting state. Selecting a node opens the panel in
//! `Detail`, unless the panel is already in `Conversation`: that mode sticks
//! across node switches and re-targets to the new node's own log.
//! Closing the panel remembers the mode it was closed from.

use crate::error::{GraphError, GraphResult};
use crate::models::{SelectionSnapshot, ViewMode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    active_node_id: Option<String>,
    view_mode: ViewMode,
    panel_open: bool,
    resume_mode: Option<ViewMode>,
}

impl Selection {
    pub fn active_node_id(&self) -> Option<&str> {
        self.active_node_id.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// The caller has already checked that `id` exists in the graph.
    pub fn select(&mut self, id: &str, mode: Option<ViewMode>) -> GraphResult<()> {
        let mode = match mode {
            Some(ViewMode::Summary) => return Err(GraphError::InvalidMode),
            Some(mode) => mode,
            None if self.in_conversation() => ViewMode::Conversation,
            None => ViewMode::Detail,
        };

        self.active_node_id = Some(id.to_string());
        self.view_mode = mode;
        self.panel_open = true;
        self.resume_mode = None;
        Ok(())
    }

    pub fn enter_conversation(&mut self) -> GraphResult<()> {
        if self.active_node_id.is_none() {
            return Err(GraphError::NoActiveNode);
        }
        self.view_mode = ViewMode::Conversation;
        self.panel_open = true;
        self.resume_mode = None;
        Ok(())
    }

    /// Hides the panel but keeps the active node and the mode it was in, so
    /// reopening restores both.
    pub fn close_panel(&mut self) {
        if self.view_mode != ViewMode::Summary {
            self.resume_mode = Some(self.view_mode);
        }
        self.view_mode = ViewMode::Summary;
        self.panel_open = false;
    }

    pub fn reopen_panel(&mut self) -> GraphResult<()> {
        if self.active_node_id.is_none() {
            return Err(GraphError::NoActiveNode);
        }
        self.view_mode = self.resume_mode.take().unwrap_or(ViewMode::Detail);
        self.panel_open = true;
        Ok(())
    }

    /// Conversation stays sticky while the panel is closed from it.
    fn in_conversation(&self) -> bool {
        self.view_mode == ViewMode::Conversation
            || self.resume_mode == Some(ViewMode::Conversation)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            active_node_id: self.active_node_id.clone(),
            view_mode: self.view_mode,
            panel_open: self.panel_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_summary_with_nothing_selected() {
        let selection = Selection::default();
        assert_eq!(selection.view_mode(), ViewMode::Summary);
        assert_eq!(selection.active_node_id(), None);
        assert!(!selection.panel_open());
    }

    #[test]
    fn select_defaults_to_detail() {
        let mut selection = Selection::default();
        selection.select("A", None).unwrap();
        assert_eq!(selection.view_mode(), ViewMode::Detail);
        assert_eq!(selection.active_node_id(), Some("A"));
        assert!(selection.panel_open());
    }

    #[test]
    fn conversation_sticks_across_node_switches() {
        let mut selection = Selection::default();
        selection.select("A", None).unwrap();
        selection.enter_conversation().unwrap();
        selection.select("B", None).unwrap();

        assert_eq!(selection.view_mode(), ViewMode::Conversation);
        assert_eq!(selection.active_node_id(), Some("B"));
    }

    #[test]
    fn explicit_mode_overrides_sticky_conversation() {
        let mut selection = Selection::default();
        selection.select("A", Some(ViewMode::Conversation)).unwrap();
        selection.select("B", Some(ViewMode::Detail)).unwrap();
        assert_eq!(selection.view_mode(), ViewMode::Detail);
    }

    #[test]
    fn summary_cannot_be_requested_on_select() {
        let mut selection = Selection::default();
        assert_eq!(
            selection.select("A", Some(ViewMode::Summary)),
            Err(GraphError::InvalidMode)
        );
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn enter_conversation_requires_selection() {
        let mut selection = Selection::default();
        assert_eq!(selection.enter_conversation(), Err(GraphError::NoActiveNode));
        assert_eq!(selection.view_mode(), ViewMode::Summary);
    }

    #[test]
    fn close_keeps_active_node_and_reopen_restores_conversation() {
        let mut selection = Selection::default();
        selection.select("A", None).unwrap();
        selection.enter_conversation().unwrap();
        selection.close_panel();

        assert_eq!(selection.view_mode(), ViewMode::Summary);
        assert!(!selection.panel_open());
        assert_eq!(selection.active_node_id(), Some("A"));

        selection.reopen_panel().unwrap();
        assert_eq!(selection.view_mode(), ViewMode::Conversation);
        assert!(selection.panel_open());
    }

    #[test]
    fn reopen_after_detail_comes_back_in_detail() {
        let mut selection = Selection::default();
        selection.select("A", None).unwrap();
        selection.close_panel();
        selection.reopen_panel().unwrap();
        assert_eq!(selection.view_mode(), ViewMode::Detail);
    }

    #[test]
    fn selecting_while_closed_from_conversation_stays_in_conversation() {
        let mut selection = Selection::default();
        selection.select("A", Some(ViewMode::Conversation)).unwrap();
        selection.close_panel();
        selection.select("B", None).unwrap();

        assert_eq!(selection.view_mode(), ViewMode::Conversation);
        assert_eq!(selection.active_node_id(), Some("B"));
    }

    #[test]
    fn close_after_close_keeps_the_remembered_mode() {
        let mut selection = Selection::default();
        selection.select("A", Some(ViewMode::Conversation)).unwrap();
        selection.close_panel();
        selection.close_panel();
        assert_eq!(selection.active_node_id(), Some("A"));

        selection.reopen_panel().unwrap();
        assert_eq!(selection.view_mode(), ViewMode::Conversation);
    }
}
