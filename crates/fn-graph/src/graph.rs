//! Port arena and link index.

use std::collections::HashMap;

use fn_core::{LogicPortId, NodeId, PortId, Real};

use crate::error::{GraphError, GraphResult};
use crate::port::{FlowPort, LogicPort, LogicRole, PortKind};
use crate::validate;

/// Initial quantity of a freshly created flow port.
pub const DEFAULT_QUANTITY: Real = 0.0;

/// Initial rate of a freshly created flow port.
pub const DEFAULT_RATE: Real = 1.0;

/// One logic link, stored as an (output, input) handle pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicLink {
    pub output: LogicPortId,
    pub input: LogicPortId,
}

/// Outcome of [`PortGraph::toggle_logic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicToggle {
    Linked,
    Unlinked,
}

/// Arena of flow and logic ports plus the links between them.
///
/// Ports live in slot vectors addressed by [`fn_core::Id`]. Removing a port empties its
/// slot; handles are never reused.
///
/// - Flow links are one-to-one and stored in both directions.
/// - Logic links are many-to-many and kept in insertion order. A port's peer
///   list is the subsequence of links mentioning it, so peer order is the
///   order links were made.
#[derive(Debug, Clone, Default)]
pub struct PortGraph {
    pub(crate) flow_ports: Vec<Option<FlowPort>>,
    pub(crate) logic_ports: Vec<Option<LogicPort>>,
    pub(crate) flow_links: HashMap<PortId, PortId>,
    pub(crate) logic_links: Vec<LogicLink>,
}

impl PortGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flow port owned by `node`.
    pub fn add_flow_port(
        &mut self,
        node: NodeId,
        label: impl Into<String>,
        kind: PortKind,
    ) -> PortId {
        let id = PortId::from_index(self.flow_ports.len() as u32);
        self.flow_ports.push(Some(FlowPort {
            id,
            node,
            label: label.into(),
            kind,
            quantity: DEFAULT_QUANTITY,
            rate: DEFAULT_RATE,
        }));
        id
    }

    /// Create a logic port owned by `node`.
    pub fn add_logic_port(&mut self, node: NodeId, role: LogicRole) -> LogicPortId {
        let id = LogicPortId::from_index(self.logic_ports.len() as u32);
        self.logic_ports.push(Some(LogicPort {
            id,
            node,
            role,
            value: 0.0,
        }));
        id
    }

    /// Tear down the port's link and free its slot.
    pub fn remove_flow_port(&mut self, port: PortId) -> GraphResult<()> {
        self.flow_port(port)
            .ok_or(GraphError::UnknownFlowPort { port })?;
        self.unlink_flow(port)?;
        self.flow_ports[port.slot()] = None;
        Ok(())
    }

    /// Drop every logic link mentioning the port and free its slot.
    pub fn remove_logic_port(&mut self, port: LogicPortId) -> GraphResult<()> {
        self.logic_port(port)
            .ok_or(GraphError::UnknownLogicPort { port })?;
        self.logic_links
            .retain(|link| link.output != port && link.input != port);
        self.logic_ports[port.slot()] = None;
        Ok(())
    }

    pub fn flow_port(&self, id: PortId) -> Option<&FlowPort> {
        self.flow_ports.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn flow_port_mut(&mut self, id: PortId) -> Option<&mut FlowPort> {
        self.flow_ports.get_mut(id.slot()).and_then(Option::as_mut)
    }

    pub fn logic_port(&self, id: LogicPortId) -> Option<&LogicPort> {
        self.logic_ports.get(id.slot()).and_then(Option::as_ref)
    }

    pub fn logic_port_mut(&mut self, id: LogicPortId) -> Option<&mut LogicPort> {
        self.logic_ports.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Iterate over live flow ports in creation order.
    pub fn flow_ports(&self) -> impl Iterator<Item = &FlowPort> {
        self.flow_ports.iter().flatten()
    }

    /// Iterate over live logic ports in creation order.
    pub fn logic_ports(&self) -> impl Iterator<Item = &LogicPort> {
        self.logic_ports.iter().flatten()
    }

    /// Link two flow ports of opposite direction.
    ///
    /// Any existing link on either port is torn down first.
    pub fn link_flow(&mut self, a: PortId, b: PortId) -> GraphResult<()> {
        if a == b {
            return Err(GraphError::SelfLink { port: a });
        }
        let kind_a = self
            .flow_port(a)
            .ok_or(GraphError::UnknownFlowPort { port: a })?
            .kind;
        let kind_b = self
            .flow_port(b)
            .ok_or(GraphError::UnknownFlowPort { port: b })?
            .kind;
        if kind_a == kind_b {
            return Err(GraphError::SameDirection { a, b });
        }

        self.unlink_flow(a)?;
        self.unlink_flow(b)?;
        self.flow_links.insert(a, b);
        self.flow_links.insert(b, a);
        Ok(())
    }

    /// Remove the port's link (if any), returning the former peer.
    pub fn unlink_flow(&mut self, port: PortId) -> GraphResult<Option<PortId>> {
        let Some(peer) = self.flow_links.remove(&port) else {
            return Ok(None);
        };
        match self.flow_links.remove(&peer) {
            Some(back) if back == port => Ok(Some(peer)),
            _ => Err(GraphError::AsymmetricLink { port, peer }),
        }
    }

    /// The port this flow port is linked to, if any.
    pub fn flow_peer(&self, port: PortId) -> Option<PortId> {
        self.flow_links.get(&port).copied()
    }

    pub fn is_flow_linked(&self, port: PortId) -> bool {
        self.flow_links.contains_key(&port)
    }

    /// All flow links as (output, input) pairs, ordered by output handle.
    pub fn flow_links(&self) -> Vec<(PortId, PortId)> {
        let mut pairs: Vec<(PortId, PortId)> = self
            .flow_links
            .iter()
            .filter(|(port, _)| {
                self.flow_port(**port)
                    .is_some_and(|p| p.kind == PortKind::Output)
            })
            .map(|(&out, &inp)| (out, inp))
            .collect();
        pairs.sort_by_key(|(out, _)| out.index());
        pairs
    }

    /// Toggle membership of the (a, b) logic pair.
    ///
    /// The pair is normalised to (output, input) so argument order does not
    /// matter. Calling twice with the same pair restores the original state.
    pub fn toggle_logic(&mut self, a: LogicPortId, b: LogicPortId) -> GraphResult<LogicToggle> {
        let link = self.normalise_logic(a, b)?;
        if let Some(pos) = self.logic_links.iter().position(|l| *l == link) {
            self.logic_links.remove(pos);
            Ok(LogicToggle::Unlinked)
        } else {
            self.logic_links.push(link);
            Ok(LogicToggle::Linked)
        }
    }

    /// Add the (a, b) logic pair unless it is already present.
    pub fn link_logic(&mut self, a: LogicPortId, b: LogicPortId) -> GraphResult<()> {
        let link = self.normalise_logic(a, b)?;
        if !self.logic_links.contains(&link) {
            self.logic_links.push(link);
        }
        Ok(())
    }

    /// Remove the (a, b) logic pair if present.
    pub fn unlink_logic(&mut self, a: LogicPortId, b: LogicPortId) -> GraphResult<bool> {
        let link = self.normalise_logic(a, b)?;
        let before = self.logic_links.len();
        self.logic_links.retain(|l| *l != link);
        Ok(self.logic_links.len() != before)
    }

    /// Peers of a logic port in link order.
    pub fn logic_peers(&self, port: LogicPortId) -> Vec<LogicPortId> {
        self.logic_links
            .iter()
            .filter_map(|link| {
                if link.output == port {
                    Some(link.input)
                } else if link.input == port {
                    Some(link.output)
                } else {
                    None
                }
            })
            .collect()
    }

    /// First-linked peer of a logic port; this is the only peer a logic input reads.
    pub fn first_logic_peer(&self, port: LogicPortId) -> Option<LogicPortId> {
        self.logic_links.iter().find_map(|link| {
            if link.output == port {
                Some(link.input)
            } else if link.input == port {
                Some(link.output)
            } else {
                None
            }
        })
    }

    /// All logic links in insertion order.
    pub fn logic_links(&self) -> &[LogicLink] {
        &self.logic_links
    }

    /// Check link symmetry and that no link references a removed port.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_flow_links(self)?;
        validate::validate_logic_links(self)
    }

    fn normalise_logic(&self, a: LogicPortId, b: LogicPortId) -> GraphResult<LogicLink> {
        let role_a = self
            .logic_port(a)
            .ok_or(GraphError::UnknownLogicPort { port: a })?
            .role;
        let role_b = self
            .logic_port(b)
            .ok_or(GraphError::UnknownLogicPort { port: b })?
            .role;
        match (role_a, role_b) {
            (LogicRole::Output, LogicRole::Input) => Ok(LogicLink {
                output: a,
                input: b,
            }),
            (LogicRole::Input, LogicRole::Output) => Ok(LogicLink {
                output: b,
                input: a,
            }),
            _ => Err(GraphError::LogicRoleMismatch { a, b }),
        }
    }
}
