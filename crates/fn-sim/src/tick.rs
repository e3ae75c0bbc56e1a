//! Single-pass tick: base port propagation then each node's transfer function.

use fn_core::NodeId;
use fn_graph::PortGraph;
use fn_nodes::{FlowSample, LogicInput, NodeError, NodeEvent, NodeIo, NodeResult, TickContext};
use tracing::{debug, info, warn};

use crate::network::Network;
use crate::node::Node;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Side effects emitted by nodes, in tick order.
    pub events: Vec<(NodeId, NodeEvent)>,
    /// Nodes whose update failed this tick; they kept their previous outputs.
    pub errors: Vec<(NodeId, NodeError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.errors.is_empty()
    }
}

const DANGLING: NodeError = NodeError::Layout {
    what: "port handle does not resolve",
};

impl Network {
    /// Advance every node once, in stored order.
    ///
    /// No topological sort: a node reading from one later in the order sees
    /// that node's output from the previous tick. Node failures never abort
    /// the pass; they are collected in the report and the failing node keeps
    /// publishing its previous outputs.
    pub fn tick(&mut self, ctx: &TickContext) -> TickReport {
        let mut report = TickReport::default();
        for index in 0..self.order.len() {
            let id = self.order[index];
            match self.update_node(id, ctx) {
                Ok(events) => report.events.extend(events.into_iter().map(|e| (id, e))),
                Err(err) => {
                    warn!(node = %id, error = %err, "node update failed; holding previous outputs");
                    report.errors.push((id, err));
                }
            }
        }
        debug!(
            nodes = self.order.len(),
            events = report.events.len(),
            errors = report.errors.len(),
            elapsed = ctx.elapsed,
            time = ctx.time,
            "tick"
        );
        report
    }

    fn update_node(&mut self, id: NodeId, ctx: &TickContext) -> NodeResult<Vec<NodeEvent>> {
        let node = self
            .nodes
            .get_mut(id.slot())
            .and_then(Option::as_mut)
            .ok_or(DANGLING)?;
        let ports = &mut self.ports;

        let mut io = propagate(ports, node)?;
        node.kind.update(&mut io, ctx)?;
        publish(ports, node, &io)?;

        for event in &io.events {
            match event {
                NodeEvent::Printed(sample) => info!(
                    target: "flownet::printer",
                    node = %id,
                    quantity = sample.quantity,
                    rate = sample.rate,
                    "{}: {} {}",
                    node.name,
                    sample.quantity,
                    sample.rate
                ),
            }
        }
        Ok(io.events)
    }
}

/// Base step shared by every node type.
///
/// Linked inputs take the peer output's values; unlinked inputs keep theirs.
/// A logic input reads its first peer, or 0 and "not linked" without one.
/// Outputs are snapshotted with their previous values.
fn propagate(ports: &mut PortGraph, node: &Node) -> NodeResult<NodeIo> {
    let mut inputs = Vec::with_capacity(node.inputs.len());
    for &port in &node.inputs {
        let source = ports.flow_peer(port).unwrap_or(port);
        let sample = flow_sample(ports, source)?;
        let slot = ports.flow_port_mut(port).ok_or(DANGLING)?;
        slot.quantity = sample.quantity;
        slot.rate = sample.rate;
        inputs.push(sample);
    }

    let outputs = node
        .outputs
        .iter()
        .map(|&port| flow_sample(ports, port))
        .collect::<NodeResult<Vec<_>>>()?;

    let logic_in = match node.logic_in {
        Some(port) => {
            let input = match ports.first_logic_peer(port) {
                Some(peer) => LogicInput::linked(ports.logic_port(peer).ok_or(DANGLING)?.value),
                None => LogicInput::unlinked(),
            };
            ports.logic_port_mut(port).ok_or(DANGLING)?.value = input.value;
            Some(input)
        }
        None => None,
    };

    let logic_out = node
        .logic_out
        .map(|port| ports.logic_port(port).map(|p| p.value).ok_or(DANGLING))
        .transpose()?;

    Ok(NodeIo {
        inputs,
        outputs,
        logic_in,
        logic_out,
        events: Vec::new(),
    })
}

fn flow_sample(ports: &PortGraph, port: fn_core::PortId) -> NodeResult<FlowSample> {
    ports
        .flow_port(port)
        .map(|p| FlowSample::new(p.quantity, p.rate))
        .ok_or(DANGLING)
}

/// Write a successful update's outputs back into the node's ports.
fn publish(ports: &mut PortGraph, node: &Node, io: &NodeIo) -> NodeResult<()> {
    for (&port, sample) in node.outputs.iter().zip(&io.outputs) {
        let slot = ports.flow_port_mut(port).ok_or(DANGLING)?;
        slot.quantity = sample.quantity;
        slot.rate = sample.rate;
    }
    if let (Some(port), Some(value)) = (node.logic_out, io.logic_out) {
        ports.logic_port_mut(port).ok_or(DANGLING)?.value = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TickContext {
        TickContext::new(0.1, 1.0)
    }

    #[test]
    fn unlinked_input_keeps_its_value() {
        let mut net = Network::new();
        let printer = net.add_node("Printer", &[]).unwrap();
        let inlet = net.port_by_label(printer, "IN").unwrap();
        net.set_flow_sample(inlet, FlowSample::new(42.0, 2.0)).unwrap();

        let report = net.tick(&ctx());
        assert_eq!(
            report.events,
            vec![(printer, NodeEvent::Printed(FlowSample::new(42.0, 2.0)))]
        );
        let outlet = net.port_by_label(printer, "OUT").unwrap();
        assert_eq!(net.flow_sample(outlet), Some(FlowSample::new(42.0, 2.0)));
    }

    #[test]
    fn unlinked_logic_input_reads_zero() {
        let mut net = Network::new();
        let clamp = net.add_node("LogicClamp", &[]).unwrap();
        let logic_in = net.logic_in_port(clamp).unwrap();
        net.set_logic_value(logic_in, 0.7).unwrap();
        net.tick(&ctx());
        assert_eq!(net.logic_value(logic_in), Some(0.0));
    }

    #[test]
    fn failing_node_holds_previous_output() {
        let mut net = Network::new();
        let merge = net.add_node("Merge", &[]).unwrap();
        let outlet = net.port_by_label(merge, "OUT").unwrap();
        net.set_flow_sample(outlet, FlowSample::new(55.0, 4.0)).unwrap();
        for label in ["IN1", "IN2"] {
            let port = net.port_by_label(merge, label).unwrap();
            net.set_flow_sample(port, FlowSample::new(30.0, 0.0)).unwrap();
        }

        let report = net.tick(&ctx());
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0],
            (id, NodeError::DivideByZero { .. }) if id == merge
        ));
        assert_eq!(net.flow_sample(outlet), Some(FlowSample::new(55.0, 4.0)));
    }
}
