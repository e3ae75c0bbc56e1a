//! The network aggregate: ordered node arena plus the port graph.

use fn_core::{LogicPortId, NodeId, PortId, Real, ensure_finite};
use fn_graph::{
    FlowPort, GraphError, LogicLink, LogicPort, LogicRole, LogicToggle, PortGraph, PortKind,
};
use fn_nodes::{FlowSample, NodeKind, Plotter};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::node::{Node, Position};

/// Ordered collection of nodes and the links between their ports.
///
/// Node order is the tick order. Node and port handles are never reused, so a
/// handle kept by a caller after removal simply stops resolving.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) ports: PortGraph,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node from its type name and initial `(name, value)` parameters.
    ///
    /// The node is appended to the tick order. Nothing is added if the type
    /// is unknown or any parameter is rejected.
    pub fn add_node(&mut self, type_name: &str, params: &[(&str, &str)]) -> EngineResult<NodeId> {
        let mut kind = NodeKind::from_type_name(type_name)?;
        let mut name = kind.type_name().to_string();
        for (key, value) in params {
            if *key == "name" {
                name = (*value).to_string();
            } else {
                kind.set_parameter(key, value)?;
            }
        }
        Ok(self.insert_node(kind, name, Position::default()))
    }

    /// Append an already-configured node, creating its ports from the type's layout.
    pub fn insert_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        position: Position,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        let layout = kind.layout();
        let inputs = layout
            .inputs
            .iter()
            .map(|label| self.ports.add_flow_port(id, *label, PortKind::Input))
            .collect();
        let outputs = layout
            .outputs
            .iter()
            .map(|label| self.ports.add_flow_port(id, *label, PortKind::Output))
            .collect();
        let logic_in = layout
            .logic_in
            .then(|| self.ports.add_logic_port(id, LogicRole::Input));
        let logic_out = layout
            .logic_out
            .then(|| self.ports.add_logic_port(id, LogicRole::Output));

        let node = Node {
            id,
            name: name.into(),
            position,
            kind,
            inputs,
            outputs,
            logic_in,
            logic_out,
        };
        debug!(node = %id, type_name = node.type_name(), name = %node.name, "node added");
        self.nodes.push(Some(node));
        self.order.push(id);
        id
    }

    /// Remove a node, tearing down every link that touches one of its ports.
    pub fn remove_node(&mut self, id: NodeId) -> EngineResult<Node> {
        let node = self.node(id).ok_or(EngineError::NodeNotFound(id))?;
        let flow: Vec<PortId> = node.flow_ports().collect();
        let logic: Vec<LogicPortId> = node.logic_ports().collect();

        for port in flow {
            self.ports.remove_flow_port(port)?;
        }
        for port in logic {
            self.ports.remove_logic_port(port)?;
        }
        self.order.retain(|n| *n != id);
        let node = self.nodes[id.slot()]
            .take()
            .ok_or(EngineError::NodeNotFound(id))?;
        debug!(node = %id, name = %node.name, "node removed");
        Ok(node)
    }

    /// Link an output flow port to an input flow port, replacing any existing
    /// link on either end.
    pub fn link_flow(&mut self, a: PortId, b: PortId) -> EngineResult<()> {
        self.ports.link_flow(a, b)?;
        debug!(a = %a, b = %b, "flow link added");
        Ok(())
    }

    /// Drop the port's flow link; returns the former peer.
    pub fn unlink_flow(&mut self, port: PortId) -> EngineResult<Option<PortId>> {
        let peer = self.ports.unlink_flow(port)?;
        if let Some(peer) = peer {
            debug!(a = %port, b = %peer, "flow link removed");
        }
        Ok(peer)
    }

    /// Toggle the logic link between `a` and `b`.
    pub fn link_logic(&mut self, a: LogicPortId, b: LogicPortId) -> EngineResult<LogicToggle> {
        let outcome = self.ports.toggle_logic(a, b)?;
        debug!(a = %a, b = %b, ?outcome, "logic link toggled");
        Ok(outcome)
    }

    /// Add the logic link between `a` and `b` unless it already exists.
    pub fn connect_logic(&mut self, a: LogicPortId, b: LogicPortId) -> EngineResult<()> {
        Ok(self.ports.link_logic(a, b)?)
    }

    /// Remove the logic link between `a` and `b`; true if it existed.
    pub fn disconnect_logic(&mut self, a: LogicPortId, b: LogicPortId) -> EngineResult<bool> {
        Ok(self.ports.unlink_logic(a, b)?)
    }

    /// Set a named parameter. `name` renames the node; everything else goes to
    /// the node type, which rejects unknown names and unparsable values.
    pub fn set_parameter(&mut self, id: NodeId, name: &str, value: &str) -> EngineResult<()> {
        let node = self.node_mut(id)?;
        if name == "name" {
            node.name = value.to_string();
        } else {
            node.kind.set_parameter(name, value)?;
        }
        debug!(node = %id, parameter = name, value, "parameter set");
        Ok(())
    }

    /// Coordinates must be finite; the node keeps its old position otherwise.
    pub fn set_position(&mut self, id: NodeId, position: Position) -> EngineResult<()> {
        let x = ensure_finite(position.x, "position x")?;
        let y = ensure_finite(position.y, "position y")?;
        self.node_mut(id)?.position = Position::new(x, y);
        Ok(())
    }

    /// Move a node to `new_index` in the tick order.
    pub fn move_node(&mut self, id: NodeId, new_index: usize) -> EngineResult<()> {
        let from = self.index_of(id).ok_or(EngineError::NodeNotFound(id))?;
        if new_index >= self.order.len() {
            return Err(EngineError::InvalidArg {
                what: "tick order index out of range",
            });
        }
        let node = self.order.remove(from);
        self.order.insert(new_index, node);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> EngineResult<&mut Node> {
        self.nodes
            .get_mut(id.slot())
            .and_then(Option::as_mut)
            .ok_or(EngineError::NodeNotFound(id))
    }

    /// Nodes in tick order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    /// Node handles in tick order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|n| *n == id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ports(&self) -> &PortGraph {
        &self.ports
    }

    pub fn flow_port(&self, id: PortId) -> Option<&FlowPort> {
        self.ports.flow_port(id)
    }

    pub fn logic_port(&self, id: LogicPortId) -> Option<&LogicPort> {
        self.ports.logic_port(id)
    }

    /// Current quantity/rate of a flow port.
    pub fn flow_sample(&self, id: PortId) -> Option<FlowSample> {
        self.ports
            .flow_port(id)
            .map(|p| FlowSample::new(p.quantity, p.rate))
    }

    /// Current value of a logic port.
    pub fn logic_value(&self, id: LogicPortId) -> Option<Real> {
        self.ports.logic_port(id).map(|p| p.value)
    }

    /// Overwrite a flow port's values; an unlinked input keeps them across ticks.
    pub fn set_flow_sample(&mut self, id: PortId, sample: FlowSample) -> EngineResult<()> {
        let port = self
            .ports
            .flow_port_mut(id)
            .ok_or(EngineError::PortNotFound(id))?;
        port.quantity = ensure_finite(sample.quantity, "port quantity")?;
        port.rate = ensure_finite(sample.rate, "port rate")?;
        Ok(())
    }

    pub fn set_logic_value(&mut self, id: LogicPortId, value: Real) -> EngineResult<()> {
        let value = ensure_finite(value, "logic value")?;
        self.ports
            .logic_port_mut(id)
            .ok_or(EngineError::LogicPortNotFound(id))?
            .value = value;
        Ok(())
    }

    pub fn flow_peer(&self, port: PortId) -> Option<PortId> {
        self.ports.flow_peer(port)
    }

    /// Peers of a logic port in link order; only the first is read.
    pub fn logic_peers(&self, port: LogicPortId) -> Vec<LogicPortId> {
        self.ports.logic_peers(port)
    }

    /// Flow links as (output, input) pairs.
    pub fn flow_links(&self) -> Vec<(PortId, PortId)> {
        self.ports.flow_links()
    }

    /// Logic links in insertion order.
    pub fn logic_links(&self) -> &[LogicLink] {
        self.ports.logic_links()
    }

    /// Find a node's flow port by its label (`IN`, `OUT1`, ...).
    pub fn port_by_label(&self, id: NodeId, label: &str) -> EngineResult<PortId> {
        let node = self.node(id).ok_or(EngineError::NodeNotFound(id))?;
        node.flow_ports()
            .find(|p| {
                self.ports
                    .flow_port(*p)
                    .is_some_and(|port| port.label == label)
            })
            .ok_or_else(|| EngineError::UnknownPortLabel {
                node: id,
                label: label.to_string(),
            })
    }

    pub fn logic_in_port(&self, id: NodeId) -> EngineResult<LogicPortId> {
        self.node(id)
            .ok_or(EngineError::NodeNotFound(id))?
            .logic_in
            .ok_or(EngineError::MissingLogicPort {
                node: id,
                what: "logic input",
            })
    }

    pub fn logic_out_port(&self, id: NodeId) -> EngineResult<LogicPortId> {
        self.node(id)
            .ok_or(EngineError::NodeNotFound(id))?
            .logic_out
            .ok_or(EngineError::MissingLogicPort {
                node: id,
                what: "logic output",
            })
    }

    /// Connect `from`'s output labelled `out` to `to`'s input labelled `input`.
    pub fn connect(&mut self, from: NodeId, out: &str, to: NodeId, input: &str) -> EngineResult<()> {
        let a = self.port_by_label(from, out)?;
        let b = self.port_by_label(to, input)?;
        self.link_flow(a, b)
    }

    /// The plotter state of a Plotter node.
    pub fn plotter(&self, id: NodeId) -> Option<&Plotter> {
        self.node(id).and_then(|n| n.kind.as_plotter())
    }

    /// Empty a Plotter node's accumulated series.
    pub fn clear_plot(&mut self, id: NodeId) -> EngineResult<()> {
        let node = self.node_mut(id)?;
        let plotter = node.kind.as_plotter_mut().ok_or(EngineError::InvalidArg {
            what: "node is not a plotter",
        })?;
        plotter.clear_series();
        Ok(())
    }

    /// Check link symmetry and that every port belongs to a live node that
    /// lists it.
    pub fn validate(&self) -> EngineResult<()> {
        self.ports.validate()?;

        for port in self.ports.flow_ports() {
            let owned = self
                .node(port.node)
                .is_some_and(|n| n.flow_ports().any(|p| p == port.id));
            if !owned {
                let peer = self.ports.flow_peer(port.id).unwrap_or(port.id);
                return Err(GraphError::DanglingLink {
                    port: port.id,
                    peer,
                }
                .into());
            }
        }
        for port in self.ports.logic_ports() {
            let owned = self
                .node(port.node)
                .is_some_and(|n| n.logic_ports().any(|p| p == port.id));
            if !owned {
                return Err(GraphError::UnknownLogicPort { port: port.id }.into());
            }
        }
        for node in self.nodes() {
            if let Some(port) = node.flow_ports().find(|p| self.ports.flow_port(*p).is_none()) {
                return Err(EngineError::PortNotFound(port));
            }
            if let Some(port) = node
                .logic_ports()
                .find(|p| self.ports.logic_port(*p).is_none())
            {
                return Err(EngineError::LogicPortNotFound(port));
            }
        }
        Ok(())
    }
}
