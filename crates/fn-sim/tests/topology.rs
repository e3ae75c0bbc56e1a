//! Topology invariants under random editing, and the background tick loop.

use std::time::Duration;

use fn_core::NodeId;
use fn_sim::{Network, SharedNetwork, TickLoop};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Add(usize),
    Remove(usize),
    LinkFlow(usize, usize),
    Unlink(usize),
    ToggleLogic(usize, usize),
}

const TYPES: [&str; 6] = ["Source", "Process", "Splitter", "Merge", "Printer", "LogicInverter"];

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0..TYPES.len()).prop_map(Edit::Add),
        any::<usize>().prop_map(Edit::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::LinkFlow(a, b)),
        any::<usize>().prop_map(Edit::Unlink),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Edit::ToggleLogic(a, b)),
    ]
}

fn pick<T: Copy>(items: &[T], i: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[i % items.len()])
}

fn apply(net: &mut Network, edit: &Edit) {
    let nodes: Vec<NodeId> = net.order().to_vec();
    let outputs: Vec<_> = net.nodes().flat_map(|n| n.outputs().to_vec()).collect();
    let inputs: Vec<_> = net.nodes().flat_map(|n| n.inputs().to_vec()).collect();
    let logic_out: Vec<_> = net.nodes().filter_map(|n| n.logic_out()).collect();
    let logic_in: Vec<_> = net.nodes().filter_map(|n| n.logic_in()).collect();

    match *edit {
        Edit::Add(t) => {
            net.add_node(TYPES[t], &[]).unwrap();
        }
        Edit::Remove(i) => {
            if let Some(id) = pick(&nodes, i) {
                net.remove_node(id).unwrap();
            }
        }
        Edit::LinkFlow(a, b) => {
            if let (Some(out), Some(inp)) = (pick(&outputs, a), pick(&inputs, b)) {
                net.link_flow(out, inp).unwrap();
            }
        }
        Edit::Unlink(i) => {
            if let Some(port) = pick(&inputs, i) {
                net.unlink_flow(port).unwrap();
            }
        }
        Edit::ToggleLogic(a, b) => {
            if let (Some(out), Some(inp)) = (pick(&logic_out, a), pick(&logic_in, b)) {
                net.link_logic(out, inp).unwrap();
            }
        }
    }
}

proptest! {
    #[test]
    fn edits_never_leave_dangling_links(edits in prop::collection::vec(edit(), 1..60)) {
        let mut net = Network::new();
        for e in &edits {
            apply(&mut net, e);
            prop_assert!(net.validate().is_ok());
        }
        for (out, inp) in net.flow_links() {
            prop_assert_eq!(net.flow_peer(out), Some(inp));
            prop_assert_eq!(net.flow_peer(inp), Some(out));
            let out_node = net.flow_port(out).unwrap().node;
            let in_node = net.flow_port(inp).unwrap().node;
            prop_assert!(net.node(out_node).is_some());
            prop_assert!(net.node(in_node).is_some());
        }
    }
}

#[test]
fn tick_loop_runs_until_stopped() {
    let shared = SharedNetwork::default();
    let printer = shared
        .with(|net| -> fn_sim::EngineResult<NodeId> {
            let source = net.add_node("Source", &[("maxQuantity", "30")])?;
            let printer = net.add_node("Printer", &[])?;
            net.connect(source, "OUT", printer, "IN")?;
            Ok(printer)
        })
        .unwrap()
        .unwrap();

    let ticker = TickLoop::spawn(shared.clone(), Duration::from_millis(1));
    let report = ticker
        .reports
        .recv_timeout(Duration::from_secs(5))
        .unwrap();
    assert!(report.events.iter().any(|(id, _)| *id == printer));

    // Editing while the loop runs goes through the same lock.
    shared
        .with(|net| net.set_parameter(printer, "name", "Outlet"))
        .unwrap()
        .unwrap();

    let ticks = ticker.stop();
    assert!(ticks >= 1);
    let name = shared
        .with(|net| net.node(printer).map(|n| n.name().to_string()))
        .unwrap();
    assert_eq!(name.as_deref(), Some("Outlet"));
}
