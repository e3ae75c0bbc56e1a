//! Error types for network editing and ticking.

use fn_core::{CoreError, LogicPortId, NodeId, PortId};
use fn_graph::GraphError;
use fn_nodes::NodeError;
use thiserror::Error;

/// Errors surfaced synchronously by the network API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Flow port not found: {0}")]
    PortNotFound(PortId),

    #[error("Logic port not found: {0}")]
    LogicPortNotFound(LogicPortId),

    #[error("Node {node} has no port labelled {label:?}")]
    UnknownPortLabel { node: NodeId, label: String },

    #[error("Node {node} has no {what}")]
    MissingLogicPort { node: NodeId, what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Network lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Node(#[from] NodeError),
}

pub type EngineResult<T> = Result<T, EngineError>;
