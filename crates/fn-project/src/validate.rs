//! Network file validation logic.

use std::collections::HashSet;

use fn_nodes::{NodeKind, Plotter, PortLayout};

use crate::schema::{FlowValueDef, NetworkFile, NodeDef, NodeKindDef, PortRef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing reference: {what} {index}")]
    MissingReference { what: &'static str, index: usize },

    #[error("Duplicate link on {what} (node {}, port {})", .port.node, .port.port)]
    DuplicateLink { what: &'static str, port: PortRef },

    #[error("Duplicate logic link {from} -> {to}")]
    DuplicateLogicLink { from: usize, to: usize },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_file(file: &NetworkFile) -> Result<(), ValidationError> {
    if file.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let layouts = file
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            validate_node(index, node)?;
            layout_of(&node.kind)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut used_outputs = HashSet::new();
    let mut used_inputs = HashSet::new();
    for link in &file.flow_links {
        let from = layouts
            .get(link.from.node)
            .ok_or(ValidationError::MissingReference {
                what: "flow link source node",
                index: link.from.node,
            })?;
        if link.from.port >= from.outputs.len() {
            return Err(ValidationError::MissingReference {
                what: "flow link output port",
                index: link.from.port,
            });
        }
        let to = layouts
            .get(link.to.node)
            .ok_or(ValidationError::MissingReference {
                what: "flow link target node",
                index: link.to.node,
            })?;
        if link.to.port >= to.inputs.len() {
            return Err(ValidationError::MissingReference {
                what: "flow link input port",
                index: link.to.port,
            });
        }
        if !used_outputs.insert(link.from) {
            return Err(ValidationError::DuplicateLink {
                what: "output port",
                port: link.from,
            });
        }
        if !used_inputs.insert(link.to) {
            return Err(ValidationError::DuplicateLink {
                what: "input port",
                port: link.to,
            });
        }
    }

    let mut logic_pairs = HashSet::new();
    for link in &file.logic_links {
        let has_out = layouts.get(link.from).is_some_and(|l| l.logic_out);
        if !has_out {
            return Err(ValidationError::MissingReference {
                what: "logic link output node",
                index: link.from,
            });
        }
        let has_in = layouts.get(link.to).is_some_and(|l| l.logic_in);
        if !has_in {
            return Err(ValidationError::MissingReference {
                what: "logic link input node",
                index: link.to,
            });
        }
        if !logic_pairs.insert((link.from, link.to)) {
            return Err(ValidationError::DuplicateLogicLink {
                from: link.from,
                to: link.to,
            });
        }
    }

    Ok(())
}

fn layout_of(kind: &NodeKindDef) -> Result<PortLayout, ValidationError> {
    NodeKind::from_type_name(kind.type_name())
        .map(|k| k.layout())
        .map_err(|e| ValidationError::InvalidValue {
            field: "kind".to_string(),
            value: kind.type_name().to_string(),
            reason: e.to_string(),
        })
}

fn validate_node(index: usize, node: &NodeDef) -> Result<(), ValidationError> {
    let finite = |field: &str, value: f64| {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue {
                field: format!("node {} {}", index, field),
                value: value.to_string(),
                reason: "must be finite".to_string(),
            })
        }
    };

    finite("position x", node.position[0])?;
    finite("position y", node.position[1])?;

    match &node.kind {
        NodeKindDef::Source { max_quantity, rate } => {
            finite("max_quantity", *max_quantity)?;
            finite("rate", *rate)?;
        }
        NodeKindDef::Process {
            power,
            min_quantity,
            max_quantity,
        } => {
            finite("power", *power)?;
            finite("min_quantity", *min_quantity)?;
            finite("max_quantity", *max_quantity)?;
        }
        NodeKindDef::Buffer {
            max_quantity,
            capacity,
            internal_quantity,
        } => {
            finite("max_quantity", *max_quantity)?;
            finite("capacity", *capacity)?;
            if *capacity < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("node {} capacity", index),
                    value: capacity.to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
            if let Some(q) = internal_quantity {
                finite("internal_quantity", *q)?;
            }
        }
        NodeKindDef::Splitter { split_ratio } => finite("split_ratio", *split_ratio)?,
        NodeKindDef::SinusSignal { period } => finite("period", *period)?,
        NodeKindDef::LogicClamp { min, max } => {
            finite("min", *min)?;
            finite("max", *max)?;
        }
        NodeKindDef::Plotter {
            capacity: Some(cap),
        } if *cap > Plotter::MAX_CAPACITY => {
            return Err(ValidationError::InvalidValue {
                field: format!("node {} capacity", index),
                value: cap.to_string(),
                reason: format!("must not exceed {}", Plotter::MAX_CAPACITY),
            });
        }
        NodeKindDef::Printer
        | NodeKindDef::Plotter { .. }
        | NodeKindDef::Merge
        | NodeKindDef::LogicInverter
        | NodeKindDef::Sensor { .. } => {}
    }

    if let Some(ports) = &node.ports {
        let layout = layout_of(&node.kind)?;
        if ports.inputs.len() != layout.inputs.len() || ports.outputs.len() != layout.outputs.len()
        {
            return Err(ValidationError::InvalidValue {
                field: format!("node {} ports", index),
                value: format!("{}/{}", ports.inputs.len(), ports.outputs.len()),
                reason: "port count does not match node type".to_string(),
            });
        }
        let flows: Vec<&FlowValueDef> = ports.inputs.iter().chain(&ports.outputs).collect();
        for flow in flows {
            finite("port quantity", flow.quantity)?;
            finite("port rate", flow.rate)?;
        }
        for value in ports.logic_in.iter().chain(&ports.logic_out) {
            finite("logic value", *value)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FlowLinkDef, LogicLinkDef, PortValuesDef};

    fn node(kind: NodeKindDef) -> NodeDef {
        NodeDef {
            name: kind.type_name().to_string(),
            position: [0.0, 0.0],
            kind,
            ports: None,
        }
    }

    fn chain() -> NetworkFile {
        NetworkFile {
            version: crate::migrate::LATEST_VERSION,
            name: "chain".to_string(),
            nodes: vec![
                node(NodeKindDef::Source {
                    max_quantity: 100.0,
                    rate: 1.0,
                }),
                node(NodeKindDef::Printer),
                node(NodeKindDef::SinusSignal { period: 10.0 }),
            ],
            flow_links: vec![FlowLinkDef {
                from: PortRef { node: 0, port: 0 },
                to: PortRef { node: 1, port: 0 },
            }],
            logic_links: vec![LogicLinkDef { from: 2, to: 0 }],
        }
    }

    #[test]
    fn valid_chain_passes() {
        validate_file(&chain()).unwrap();
    }

    #[test]
    fn newer_version_rejected() {
        let mut f = chain();
        f.version = crate::migrate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn link_to_missing_port_rejected() {
        let mut f = chain();
        f.flow_links[0].to.port = 1;
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::MissingReference { .. })
        ));

        let mut f = chain();
        f.logic_links.push(LogicLinkDef { from: 1, to: 0 });
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn input_linked_twice_rejected() {
        let mut f = chain();
        f.nodes.push(node(NodeKindDef::Source {
            max_quantity: 1.0,
            rate: 1.0,
        }));
        f.flow_links.push(FlowLinkDef {
            from: PortRef { node: 3, port: 0 },
            to: PortRef { node: 1, port: 0 },
        });
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::DuplicateLink { .. })
        ));
    }

    #[test]
    fn non_finite_values_rejected() {
        let mut f = chain();
        f.nodes[1].ports = Some(PortValuesDef {
            inputs: vec![FlowValueDef {
                quantity: f64::NAN,
                rate: 1.0,
            }],
            outputs: vec![FlowValueDef {
                quantity: 0.0,
                rate: 1.0,
            }],
            ..Default::default()
        });
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn non_finite_position_rejected() {
        let mut f = chain();
        f.nodes[0].position = [f64::INFINITY, 0.0];
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::InvalidValue { field, .. }) if field == "node 0 position x"
        ));
    }

    #[test]
    fn plotter_capacity_bounded() {
        let mut f = chain();
        f.nodes.push(node(NodeKindDef::Plotter {
            capacity: Some(Plotter::MAX_CAPACITY),
        }));
        validate_file(&f).unwrap();

        f.nodes[3].kind = NodeKindDef::Plotter {
            capacity: Some(Plotter::MAX_CAPACITY + 1),
        };
        assert!(matches!(
            validate_file(&f),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
