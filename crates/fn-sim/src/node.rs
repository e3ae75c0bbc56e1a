//! Node record held by the network arena.

use fn_core::{LogicPortId, NodeId, PortId};
use fn_nodes::NodeKind;

/// Editor-owned placement; the engine stores it but never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A typed processing unit and the handles of the ports it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) position: Position,
    pub(crate) kind: NodeKind,
    pub(crate) inputs: Vec<PortId>,
    pub(crate) outputs: Vec<PortId>,
    pub(crate) logic_in: Option<LogicPortId>,
    pub(crate) logic_out: Option<LogicPortId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Input flow ports in layout order.
    pub fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    /// Output flow ports in layout order.
    pub fn outputs(&self) -> &[PortId] {
        &self.outputs
    }

    pub fn logic_in(&self) -> Option<LogicPortId> {
        self.logic_in
    }

    pub fn logic_out(&self) -> Option<LogicPortId> {
        self.logic_out
    }

    /// Every editable parameter, `name` first, then the type's own.
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("name", self.name.clone())];
        params.extend(self.kind.parameters());
        params
    }

    /// Flow port handles owned by this node, inputs first.
    pub fn flow_ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }

    /// Logic port handles owned by this node, input first.
    pub fn logic_ports(&self) -> impl Iterator<Item = LogicPortId> {
        self.logic_in.into_iter().chain(self.logic_out)
    }
}
