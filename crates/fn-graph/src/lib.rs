//! fn-graph: port/link layer for flownet.
//!
//! Provides:
//! - Flow and logic port records, owned by an arena and addressed by stable handles
//! - A symmetric one-to-one index for flow links
//! - An ordered, many-to-many list of logic links
//! - Structural validation (symmetry, no dangling links)
//!
//! # Example
//!
//! ```
//! use fn_core::NodeId;
//! use fn_graph::{PortGraph, PortKind};
//!
//! let mut ports = PortGraph::new();
//! let out = ports.add_flow_port(NodeId::from_index(0), "OUT", PortKind::Output);
//! let inp = ports.add_flow_port(NodeId::from_index(1), "IN", PortKind::Input);
//! ports.link_flow(out, inp).unwrap();
//!
//! assert_eq!(ports.flow_peer(out), Some(inp));
//! assert_eq!(ports.flow_peer(inp), Some(out));
//! ```

pub mod error;
pub mod graph;
pub mod port;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use error::{GraphError, GraphResult};
pub use graph::{LogicLink, LogicToggle, PortGraph};
pub use port::{FlowPort, LogicPort, LogicRole, PortKind};
