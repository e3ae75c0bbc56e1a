//! Conversion between a live [`Network`] and its [`NetworkFile`] form.

use std::collections::HashMap;

use fn_core::{NodeId, PortId};
use fn_nodes::{
    Buffer, FlowSample, LogicClamp, LogicInverter, Merge, NodeKind, Plotter, Printer, Process,
    Sensor, SinusSignal, Source, Splitter,
};
use fn_sim::{EngineError, Network, Node, Position};

use crate::ProjectResult;
use crate::migrate::LATEST_VERSION;
use crate::schema::{
    FlowLinkDef, FlowValueDef, LogicLinkDef, NetworkFile, NodeDef, NodeKindDef, PortRef,
    PortValuesDef,
};
use crate::validate::validate_file;

/// Snapshot a network: nodes in tick order, links, and current port values.
pub fn network_to_file(network: &Network, name: &str) -> ProjectResult<NetworkFile> {
    let index: HashMap<NodeId, usize> = network
        .order()
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();
    let slot = |id: NodeId| -> ProjectResult<usize> {
        Ok(*index.get(&id).ok_or(EngineError::NodeNotFound(id))?)
    };

    let nodes = network
        .nodes()
        .map(|node| node_to_def(network, node))
        .collect::<ProjectResult<Vec<_>>>()?;

    let flow_ref = |port: PortId, outputs: bool| -> ProjectResult<PortRef> {
        let owner = network
            .flow_port(port)
            .ok_or(EngineError::PortNotFound(port))?
            .node;
        let node = network.node(owner).ok_or(EngineError::NodeNotFound(owner))?;
        let list = if outputs { node.outputs() } else { node.inputs() };
        let position = list
            .iter()
            .position(|p| *p == port)
            .ok_or(EngineError::PortNotFound(port))?;
        Ok(PortRef {
            node: slot(owner)?,
            port: position,
        })
    };

    let flow_links = network
        .flow_links()
        .into_iter()
        .map(|(out, inp)| {
            Ok(FlowLinkDef {
                from: flow_ref(out, true)?,
                to: flow_ref(inp, false)?,
            })
        })
        .collect::<ProjectResult<Vec<_>>>()?;

    let logic_links = network
        .logic_links()
        .iter()
        .map(|link| {
            let from = network
                .logic_port(link.output)
                .ok_or(EngineError::LogicPortNotFound(link.output))?
                .node;
            let to = network
                .logic_port(link.input)
                .ok_or(EngineError::LogicPortNotFound(link.input))?
                .node;
            Ok(LogicLinkDef {
                from: slot(from)?,
                to: slot(to)?,
            })
        })
        .collect::<ProjectResult<Vec<_>>>()?;

    Ok(NetworkFile {
        version: LATEST_VERSION,
        name: name.to_string(),
        nodes,
        flow_links,
        logic_links,
    })
}

/// Rebuild a network from a validated, migrated file.
pub fn file_to_network(file: &NetworkFile) -> ProjectResult<Network> {
    validate_file(file)?;

    let mut network = Network::new();
    let mut ids = Vec::with_capacity(file.nodes.len());
    for def in &file.nodes {
        let kind = kind_from_def(&def.kind)?;
        let id = network.insert_node(
            kind,
            def.name.clone(),
            Position::new(def.position[0], def.position[1]),
        );
        if let Some(ports) = &def.ports {
            restore_ports(&mut network, id, ports)?;
        }
        ids.push(id);
    }

    for link in &file.flow_links {
        let out = network
            .node(ids[link.from.node])
            .map(|n| n.outputs()[link.from.port])
            .ok_or(EngineError::NodeNotFound(ids[link.from.node]))?;
        let inp = network
            .node(ids[link.to.node])
            .map(|n| n.inputs()[link.to.port])
            .ok_or(EngineError::NodeNotFound(ids[link.to.node]))?;
        network.link_flow(out, inp)?;
    }

    for link in &file.logic_links {
        let out = network.logic_out_port(ids[link.from])?;
        let inp = network.logic_in_port(ids[link.to])?;
        network.connect_logic(out, inp)?;
    }

    Ok(network)
}

fn node_to_def(network: &Network, node: &Node) -> ProjectResult<NodeDef> {
    let flow = |port: &PortId| -> ProjectResult<FlowValueDef> {
        let sample = network
            .flow_sample(*port)
            .ok_or(EngineError::PortNotFound(*port))?;
        Ok(FlowValueDef {
            quantity: sample.quantity,
            rate: sample.rate,
        })
    };
    let ports = PortValuesDef {
        inputs: node.inputs().iter().map(flow).collect::<ProjectResult<_>>()?,
        outputs: node.outputs().iter().map(flow).collect::<ProjectResult<_>>()?,
        logic_in: node.logic_in().and_then(|p| network.logic_value(p)),
        logic_out: node.logic_out().and_then(|p| network.logic_value(p)),
    };
    let position = node.position();
    Ok(NodeDef {
        name: node.name().to_string(),
        position: [position.x, position.y],
        kind: kind_to_def(node.kind()),
        ports: Some(ports),
    })
}

fn restore_ports(network: &mut Network, id: NodeId, ports: &PortValuesDef) -> ProjectResult<()> {
    let node = network.node(id).ok_or(EngineError::NodeNotFound(id))?;
    let flows: Vec<(PortId, FlowValueDef)> = node
        .inputs()
        .iter()
        .copied()
        .zip(ports.inputs.iter().copied())
        .chain(node.outputs().iter().copied().zip(ports.outputs.iter().copied()))
        .collect();
    let logic_in = node.logic_in().zip(ports.logic_in);
    let logic_out = node.logic_out().zip(ports.logic_out);

    for (port, value) in flows {
        network.set_flow_sample(port, FlowSample::new(value.quantity, value.rate))?;
    }
    for (port, value) in logic_in.into_iter().chain(logic_out) {
        network.set_logic_value(port, value)?;
    }
    Ok(())
}

pub fn kind_to_def(kind: &NodeKind) -> NodeKindDef {
    match kind {
        NodeKind::Source(s) => NodeKindDef::Source {
            max_quantity: s.max_quantity,
            rate: s.rate,
        },
        NodeKind::Printer(_) => NodeKindDef::Printer,
        NodeKind::Plotter(p) => NodeKindDef::Plotter {
            capacity: p.capacity(),
        },
        NodeKind::Process(p) => NodeKindDef::Process {
            power: p.power,
            min_quantity: p.min_quantity,
            max_quantity: p.max_quantity,
        },
        NodeKind::Buffer(b) => NodeKindDef::Buffer {
            max_quantity: b.max_quantity,
            capacity: b.capacity,
            internal_quantity: Some(b.internal_quantity),
        },
        NodeKind::Splitter(s) => NodeKindDef::Splitter {
            split_ratio: s.split_ratio,
        },
        NodeKind::Merge(_) => NodeKindDef::Merge,
        NodeKind::SinusSignal(s) => NodeKindDef::SinusSignal { period: s.period },
        NodeKind::LogicClamp(c) => NodeKindDef::LogicClamp {
            min: c.min,
            max: c.max,
        },
        NodeKind::LogicInverter(_) => NodeKindDef::LogicInverter,
        NodeKind::Sensor(s) => NodeKindDef::Sensor {
            expression: s.expression().source().to_string(),
        },
    }
}

pub fn kind_from_def(def: &NodeKindDef) -> ProjectResult<NodeKind> {
    let kind = match def {
        NodeKindDef::Source { max_quantity, rate } => {
            NodeKind::Source(Source::new(*max_quantity, *rate))
        }
        NodeKindDef::Printer => NodeKind::Printer(Printer),
        NodeKindDef::Plotter { capacity } => {
            NodeKind::Plotter(capacity.map_or_else(Plotter::new, Plotter::with_capacity))
        }
        NodeKindDef::Process {
            power,
            min_quantity,
            max_quantity,
        } => NodeKind::Process(Process::new(*power, *min_quantity, *max_quantity)),
        NodeKindDef::Buffer {
            max_quantity,
            capacity,
            internal_quantity,
        } => {
            let mut buffer = Buffer::new(*max_quantity, *capacity);
            if let Some(q) = internal_quantity {
                buffer.internal_quantity = *q;
            }
            NodeKind::Buffer(buffer)
        }
        NodeKindDef::Splitter { split_ratio } => NodeKind::Splitter(Splitter::new(*split_ratio)),
        NodeKindDef::Merge => NodeKind::Merge(Merge),
        NodeKindDef::SinusSignal { period } => NodeKind::SinusSignal(SinusSignal::new(*period)),
        NodeKindDef::LogicClamp { min, max } => NodeKind::LogicClamp(LogicClamp::new(*min, *max)),
        NodeKindDef::LogicInverter => NodeKind::LogicInverter(LogicInverter),
        NodeKindDef::Sensor { expression } => {
            NodeKind::Sensor(Sensor::new(expression).map_err(EngineError::from)?)
        }
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips() {
        for name in NodeKind::TYPE_NAMES {
            let kind = NodeKind::from_type_name(name).unwrap();
            let back = kind_from_def(&kind_to_def(&kind)).unwrap();
            assert_eq!(back, kind, "{name}");
        }
    }

    #[test]
    fn bad_sensor_expression_fails_load() {
        let def = NodeKindDef::Sensor {
            expression: "import os".to_string(),
        };
        assert!(kind_from_def(&def).is_err());
    }

    #[test]
    fn plotter_capacity_round_trips() {
        for plotter in [
            Plotter::new(),
            Plotter::with_capacity(0),
            Plotter::with_capacity(32),
        ] {
            let kind = NodeKind::Plotter(plotter);
            let back = kind_from_def(&kind_to_def(&kind)).unwrap();
            assert_eq!(back.as_plotter().unwrap().capacity(), kind.as_plotter().unwrap().capacity());
        }
    }
}
