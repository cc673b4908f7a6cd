//! Errors raised by the graph session.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("item at index {index} is missing required field `{field}`")]
    Validation { index: usize, field: &'static str },

    #[error("node not found: {id}")]
    NotFound { id: String },

    #[error("no node is selected")]
    NoActiveNode,

    #[error("a node cannot be selected in summary mode")]
    InvalidMode,
}

pub type GraphResult<T> = Result<T, GraphError>;
