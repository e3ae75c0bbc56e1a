//! Built-in demo networks.

use fn_sim::{EngineResult, Network, Position};

pub const NAMES: [&str; 3] = ["chain", "merge", "plant"];

pub fn build(name: &str) -> Option<EngineResult<Network>> {
    match name {
        "chain" => Some(chain()),
        "merge" => Some(merge()),
        "plant" => Some(plant()),
        _ => None,
    }
}

/// Source -> Process -> Printer.
fn chain() -> EngineResult<Network> {
    let mut net = Network::new();
    let source = net.add_node("Source", &[("maxQuantity", "100"), ("rate", "1")])?;
    let process = net.add_node(
        "Process",
        &[("power", "100"), ("minQuantity", "0"), ("maxQuantity", "100")],
    )?;
    let printer = net.add_node("Printer", &[])?;
    net.connect(source, "OUT", process, "IN")?;
    net.connect(process, "OUT", printer, "IN")?;
    lay_out(&mut net)?;
    Ok(net)
}

/// Two sources mixed by a Merge.
fn merge() -> EngineResult<Network> {
    let mut net = Network::new();
    let hot = net.add_node("Source", &[("name", "Hot"), ("maxQuantity", "100"), ("rate", "2")])?;
    let cold = net.add_node("Source", &[("name", "Cold"), ("maxQuantity", "50"), ("rate", "1")])?;
    let merge = net.add_node("Merge", &[])?;
    let printer = net.add_node("Printer", &[])?;
    net.connect(hot, "OUT", merge, "IN1")?;
    net.connect(cold, "OUT", merge, "IN2")?;
    net.connect(merge, "OUT", printer, "IN")?;
    lay_out(&mut net)?;
    Ok(net)
}

/// Heater loop with a sensor-throttled process, a sinus-driven splitter,
/// a buffer tank on one branch and a plotter on the outlet.
fn plant() -> EngineResult<Network> {
    let mut net = Network::new();
    let feed = net.add_node("Source", &[("name", "Feed"), ("maxQuantity", "40"), ("rate", "2")])?;
    let sensor = net.add_node(
        "Sensor",
        &[("name", "Inlet sensor"), ("expression", "(60 - temp) / 40")],
    )?;
    let heater = net.add_node("Process", &[("name", "Heater"), ("power", "300")])?;
    let sinus = net.add_node("SinusSignal", &[("period", "20")])?;
    let split = net.add_node("Splitter", &[])?;
    let tank = net.add_node("Buffer", &[("name", "Tank"), ("capacity", "8")])?;
    let merge = net.add_node("Merge", &[])?;
    let plot = net.add_node("Plotter", &[("name", "Outlet plot"), ("capacity", "600")])?;
    let printer = net.add_node("Printer", &[("name", "Outlet")])?;

    net.connect(feed, "OUT", sensor, "IN")?;
    net.connect(sensor, "OUT", heater, "IN")?;
    net.connect(heater, "OUT", split, "IN")?;
    net.connect(split, "OUT1", tank, "IN")?;
    net.connect(tank, "OUT", merge, "IN1")?;
    net.connect(split, "OUT2", merge, "IN2")?;
    net.connect(merge, "OUT", plot, "IN")?;
    net.connect(plot, "OUT", printer, "IN")?;

    net.link_logic(net.logic_out_port(sensor)?, net.logic_in_port(heater)?)?;
    net.link_logic(net.logic_out_port(sinus)?, net.logic_in_port(split)?)?;
    lay_out(&mut net)?;
    Ok(net)
}

/// Place nodes left to right in tick order.
fn lay_out(net: &mut Network) -> EngineResult<()> {
    let order = net.order().to_vec();
    for (i, id) in order.into_iter().enumerate() {
        net.set_position(id, Position::new(40.0 + 160.0 * i as f64, 120.0))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fn_nodes::TickContext;

    #[test]
    fn demos_build_and_tick_cleanly() {
        for name in NAMES {
            let mut net = build(name).unwrap().unwrap();
            net.validate().unwrap();
            for step in 1..=20 {
                let report = net.tick(&TickContext::new(0.1, step as f64 * 0.1));
                assert!(report.is_clean(), "{name}: {:?}", report.errors);
            }
        }
        assert!(build("turbine").is_none());
    }
}
