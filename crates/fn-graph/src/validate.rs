//! Link validation logic.

use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};
use crate::graph::PortGraph;
use crate::port::LogicRole;

/// Every flow link must point at a live port of the opposite direction,
/// and be recorded from both ends.
pub(crate) fn validate_flow_links(graph: &PortGraph) -> GraphResult<()> {
    for (&port, &peer) in &graph.flow_links {
        let Some(this) = graph.flow_port(port) else {
            return Err(GraphError::DanglingLink { port: peer, peer: port });
        };
        let Some(other) = graph.flow_port(peer) else {
            return Err(GraphError::DanglingLink { port, peer });
        };
        if this.kind == other.kind {
            return Err(GraphError::SameDirection { a: port, b: peer });
        }
        if graph.flow_links.get(&peer) != Some(&port) {
            return Err(GraphError::AsymmetricLink { port, peer });
        }
    }
    Ok(())
}

/// Every logic link must join a live output to a live input, at most once.
pub(crate) fn validate_logic_links(graph: &PortGraph) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for link in &graph.logic_links {
        let output = graph
            .logic_port(link.output)
            .ok_or(GraphError::DanglingLink {
                port: link.input,
                peer: link.output,
            })?;
        let input = graph
            .logic_port(link.input)
            .ok_or(GraphError::DanglingLink {
                port: link.output,
                peer: link.input,
            })?;
        if output.role != LogicRole::Output || input.role != LogicRole::Input {
            return Err(GraphError::LogicRoleMismatch {
                a: link.output,
                b: link.input,
            });
        }
        if !seen.insert(*link) {
            return Err(GraphError::DuplicateLogicLink {
                output: link.output,
                input: link.input,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LogicLink;
    use crate::port::PortKind;
    use fn_core::NodeId;

    #[test]
    fn validate_empty_graph() {
        let graph = PortGraph::new();
        assert!(validate_flow_links(&graph).is_ok());
        assert!(validate_logic_links(&graph).is_ok());
    }

    #[test]
    fn detects_asymmetric_flow_link() {
        let mut graph = PortGraph::new();
        let out = graph.add_flow_port(NodeId::from_index(0), "OUT", PortKind::Output);
        let inp = graph.add_flow_port(NodeId::from_index(1), "IN", PortKind::Input);
        graph.flow_links.insert(out, inp);

        assert_eq!(
            validate_flow_links(&graph),
            Err(GraphError::AsymmetricLink {
                port: out,
                peer: inp
            })
        );
    }

    #[test]
    fn detects_dangling_flow_link() {
        let mut graph = PortGraph::new();
        let out = graph.add_flow_port(NodeId::from_index(0), "OUT", PortKind::Output);
        let inp = graph.add_flow_port(NodeId::from_index(1), "IN", PortKind::Input);
        graph.flow_links.insert(out, inp);
        graph.flow_links.insert(inp, out);
        // Free the slot without going through remove_flow_port
        graph.flow_ports[inp.slot()] = None;

        let result = validate_flow_links(&graph);
        assert!(matches!(result, Err(GraphError::DanglingLink { .. })));
    }

    #[test]
    fn detects_duplicate_logic_link() {
        let mut graph = PortGraph::new();
        let out = graph.add_logic_port(NodeId::from_index(0), LogicRole::Output);
        let inp = graph.add_logic_port(NodeId::from_index(1), LogicRole::Input);
        let link = LogicLink { output: out, input: inp };
        graph.logic_links.push(link);
        graph.logic_links.push(link);

        assert!(matches!(
            validate_logic_links(&graph),
            Err(GraphError::DuplicateLogicLink { .. })
        ));
    }
}
