//! # Research Graph
//!
//! Incremental graph state for exploring research papers in 3D.
//!
//! Search results become the first nodes of the graph. Expanding a node
//! fetches its related papers from the retrieval backend and layers them onto
//! the existing graph, deduplicating nodes and undirected edges and coloring
//! everything one expansion adds with a shared color. A selection state
//! machine and per-node chat transcripts sit on top of the same graph.
//!
//! ```text
//! search ─▶ initial nodes ─▶ select ─▶ expand ─▶ fetch related ─▶ merge ─┐
//!                               ▲                                        │
//!                               └────────────────────────────────────────┘
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`graph`] | Ingestion and expansion merge |
//! | [`selection`] | Active node and view mode |
//! | [`conversation`] | Per-node chat transcripts |
//! | [`session`] | Owner of all of the above, reset lifecycle |
//! | [`backend`] | Retrieval backend client |
//! | [`api`] | HTTP API consumed by the frontend |

pub mod api;
pub mod app_state;
pub mod backend;
pub mod config;
pub mod conversation;
pub mod error;
pub mod graph;
pub mod models;
pub mod selection;
pub mod session;

pub use error::{GraphError, GraphResult};
pub use models::{GraphEdge, GraphNode, Item, ItemRecord, Message, Speaker, ViewMode};
pub use session::GraphSession;
