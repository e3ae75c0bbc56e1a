//! Port records.

use fn_core::{LogicPortId, NodeId, PortId, Real};

/// Direction of a flow port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Receives quantity/rate from an upstream output.
    Input,
    /// Publishes quantity/rate computed by its node.
    Output,
}

impl PortKind {
    pub fn opposite(self) -> Self {
        match self {
            PortKind::Input => PortKind::Output,
            PortKind::Output => PortKind::Input,
        }
    }
}

/// One physical connection point on a node.
///
/// The link itself is not stored here; see [`crate::PortGraph::flow_peer`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPort {
    pub id: PortId,
    pub node: NodeId,
    pub label: String,
    pub kind: PortKind,
    /// Carried quantity (e.g. temperature).
    pub quantity: Real,
    /// Throughput associated with the quantity (e.g. volumetric flow).
    pub rate: Real,
}

impl FlowPort {
    pub fn is_input(&self) -> bool {
        self.kind == PortKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == PortKind::Output
    }
}

/// Role of a logic port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicRole {
    Input,
    Output,
}

/// Control-signal connection point.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicPort {
    pub id: LogicPortId,
    pub node: NodeId,
    pub role: LogicRole,
    /// Conventionally in [0, 1]; the port itself does not clamp.
    pub value: Real,
}
