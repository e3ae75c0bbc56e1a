//! Closed catalogue of node types.

use crate::buffer::Buffer;
use crate::error::{NodeError, NodeResult};
use crate::logic::{LogicClamp, LogicInverter, SinusSignal};
use crate::merge::Merge;
use crate::process::Process;
use crate::sensor::Sensor;
use crate::source::Source;
use crate::splitter::Splitter;
use crate::tap::{Plotter, Printer};
use crate::traits::{NodeIo, NodeModel, PortLayout, TickContext};

/// Every node type the engine knows, each with its typed parameters and state.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Source(Source),
    Printer(Printer),
    Plotter(Plotter),
    Process(Process),
    Buffer(Buffer),
    Splitter(Splitter),
    Merge(Merge),
    SinusSignal(SinusSignal),
    LogicClamp(LogicClamp),
    LogicInverter(LogicInverter),
    Sensor(Sensor),
}

impl NodeKind {
    /// Type names accepted by [`NodeKind::from_type_name`].
    pub const TYPE_NAMES: [&'static str; 11] = [
        "Source",
        "Printer",
        "Plotter",
        "Process",
        "Buffer",
        "Splitter",
        "Merge",
        "SinusSignal",
        "LogicClamp",
        "LogicInverter",
        "Sensor",
    ];

    /// Factory: a node of the named type with its default parameters.
    pub fn from_type_name(name: &str) -> NodeResult<Self> {
        let kind = match name {
            "Source" => NodeKind::Source(Source::default()),
            "Printer" | "Sink" => NodeKind::Printer(Printer),
            "Plotter" => NodeKind::Plotter(Plotter::default()),
            "Process" => NodeKind::Process(Process::default()),
            "Buffer" => NodeKind::Buffer(Buffer::default()),
            "Splitter" => NodeKind::Splitter(Splitter::default()),
            "Merge" => NodeKind::Merge(Merge),
            "SinusSignal" => NodeKind::SinusSignal(SinusSignal::default()),
            "LogicClamp" => NodeKind::LogicClamp(LogicClamp::default()),
            "LogicInverter" => NodeKind::LogicInverter(LogicInverter),
            "Sensor" => NodeKind::Sensor(Sensor::default()),
            other => return Err(NodeError::UnknownNodeType(other.to_string())),
        };
        Ok(kind)
    }

    /// Canonical type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Source(_) => "Source",
            NodeKind::Printer(_) => "Printer",
            NodeKind::Plotter(_) => "Plotter",
            NodeKind::Process(_) => "Process",
            NodeKind::Buffer(_) => "Buffer",
            NodeKind::Splitter(_) => "Splitter",
            NodeKind::Merge(_) => "Merge",
            NodeKind::SinusSignal(_) => "SinusSignal",
            NodeKind::LogicClamp(_) => "LogicClamp",
            NodeKind::LogicInverter(_) => "LogicInverter",
            NodeKind::Sensor(_) => "Sensor",
        }
    }

    fn model(&self) -> &dyn NodeModel {
        match self {
            NodeKind::Source(n) => n,
            NodeKind::Printer(n) => n,
            NodeKind::Plotter(n) => n,
            NodeKind::Process(n) => n,
            NodeKind::Buffer(n) => n,
            NodeKind::Splitter(n) => n,
            NodeKind::Merge(n) => n,
            NodeKind::SinusSignal(n) => n,
            NodeKind::LogicClamp(n) => n,
            NodeKind::LogicInverter(n) => n,
            NodeKind::Sensor(n) => n,
        }
    }

    fn model_mut(&mut self) -> &mut dyn NodeModel {
        match self {
            NodeKind::Source(n) => n,
            NodeKind::Printer(n) => n,
            NodeKind::Plotter(n) => n,
            NodeKind::Process(n) => n,
            NodeKind::Buffer(n) => n,
            NodeKind::Splitter(n) => n,
            NodeKind::Merge(n) => n,
            NodeKind::SinusSignal(n) => n,
            NodeKind::LogicClamp(n) => n,
            NodeKind::LogicInverter(n) => n,
            NodeKind::Sensor(n) => n,
        }
    }

    pub fn layout(&self) -> PortLayout {
        self.model().layout()
    }

    pub fn update(&mut self, io: &mut NodeIo, ctx: &TickContext) -> NodeResult<()> {
        self.model_mut().update(io, ctx)
    }

    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        self.model().parameters()
    }

    pub fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        self.model_mut().set_parameter(name, value)
    }

    /// The plotter behind this kind, if it is one.
    pub fn as_plotter(&self) -> Option<&Plotter> {
        match self {
            NodeKind::Plotter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_plotter_mut(&mut self) -> Option<&mut Plotter> {
        match self {
            NodeKind::Plotter(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_round_trips_type_names() {
        for name in NodeKind::TYPE_NAMES {
            let kind = NodeKind::from_type_name(name).unwrap();
            assert_eq!(kind.type_name(), name);
        }
    }

    #[test]
    fn unknown_type_rejected() {
        assert_eq!(
            NodeKind::from_type_name("Turbine"),
            Err(NodeError::UnknownNodeType("Turbine".into()))
        );
    }

    #[test]
    fn layouts_match_catalogue() {
        let splitter = NodeKind::from_type_name("Splitter").unwrap().layout();
        assert_eq!(splitter.outputs, &["OUT1", "OUT2"]);
        assert!(splitter.logic_in);

        let merge = NodeKind::from_type_name("Merge").unwrap().layout();
        assert_eq!(merge.inputs.len(), 2);
        assert!(!merge.logic_in && !merge.logic_out);

        let sinus = NodeKind::from_type_name("SinusSignal").unwrap().layout();
        assert!(sinus.inputs.is_empty() && sinus.outputs.is_empty());
        assert!(sinus.logic_out);
    }

    #[test]
    fn set_parameter_dispatches() {
        let mut kind = NodeKind::from_type_name("Process").unwrap();
        kind.set_parameter("power", "250").unwrap();
        assert!(kind.parameters().contains(&("power", "250".to_string())));
        assert!(matches!(
            kind.set_parameter("power", "lots"),
            Err(NodeError::InvalidParameter { .. })
        ));
        assert!(matches!(
            kind.set_parameter("colour", "1"),
            Err(NodeError::InvalidParameter { .. })
        ));
    }
}
