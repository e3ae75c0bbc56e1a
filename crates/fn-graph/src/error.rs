//! Graph-specific error types.

use fn_core::{LogicPortId, PortId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Port linking and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Flow port handle does not resolve to a live port.
    UnknownFlowPort { port: PortId },

    /// Logic port handle does not resolve to a live port.
    UnknownLogicPort { port: LogicPortId },

    /// Flow links must join an output to an input.
    SameDirection { a: PortId, b: PortId },

    /// A port cannot be linked to itself.
    SelfLink { port: PortId },

    /// Logic links must join a logic output to a logic input.
    LogicRoleMismatch { a: LogicPortId, b: LogicPortId },

    /// A link references a port that no longer exists.
    DanglingLink { port: PortId, peer: PortId },

    /// A flow link is recorded in one direction only.
    AsymmetricLink { port: PortId, peer: PortId },

    /// The same logic pair appears twice in the link list.
    DuplicateLogicLink {
        output: LogicPortId,
        input: LogicPortId,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnknownFlowPort { port } => {
                write!(f, "Flow port {} does not exist", port)
            }
            GraphError::UnknownLogicPort { port } => {
                write!(f, "Logic port {} does not exist", port)
            }
            GraphError::SameDirection { a, b } => {
                write!(
                    f,
                    "Flow ports {} and {} have the same direction (need output -> input)",
                    a, b
                )
            }
            GraphError::SelfLink { port } => {
                write!(f, "Port {} cannot be linked to itself", port)
            }
            GraphError::LogicRoleMismatch { a, b } => {
                write!(
                    f,
                    "Logic ports {} and {} have the same role (need output -> input)",
                    a, b
                )
            }
            GraphError::DanglingLink { port, peer } => {
                write!(f, "Port {} links to removed port {}", port, peer)
            }
            GraphError::AsymmetricLink { port, peer } => {
                write!(f, "Port {} links to {} but not the other way round", port, peer)
            }
            GraphError::DuplicateLogicLink { output, input } => {
                write!(f, "Logic link {} -> {} recorded twice", output, input)
            }
        }
    }
}

impl std::error::Error for GraphError {}
