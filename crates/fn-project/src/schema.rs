//! Network file schema definitions.
//!
//! One schema serves the binary codec and the YAML/JSON text formats. The
//! binary form is not self-describing, so every field is always written and
//! enums use serde's default external tagging.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkFile {
    pub version: u32,
    #[serde(default)]
    pub name: String,
    /// Nodes in tick order.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub flow_links: Vec<FlowLinkDef>,
    /// Logic links in the order they were made; this order decides which
    /// peer a logic input reads.
    #[serde(default)]
    pub logic_links: Vec<LogicLinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub name: String,
    #[serde(default)]
    pub position: [f64; 2],
    pub kind: NodeKindDef,
    /// Port values at save time; absent in files written before version 2.
    #[serde(default)]
    pub ports: Option<PortValuesDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NodeKindDef {
    Source {
        max_quantity: f64,
        rate: f64,
    },
    Printer,
    Plotter {
        /// Retained samples; `None` is unbounded.
        #[serde(default)]
        capacity: Option<usize>,
    },
    Process {
        power: f64,
        min_quantity: f64,
        max_quantity: f64,
    },
    Buffer {
        max_quantity: f64,
        capacity: f64,
        /// Tank contents; filled in by migration for version 1 files.
        #[serde(default)]
        internal_quantity: Option<f64>,
    },
    Splitter {
        split_ratio: f64,
    },
    Merge,
    SinusSignal {
        period: f64,
    },
    LogicClamp {
        min: f64,
        max: f64,
    },
    LogicInverter,
    Sensor {
        expression: String,
    },
}

impl NodeKindDef {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKindDef::Source { .. } => "Source",
            NodeKindDef::Printer => "Printer",
            NodeKindDef::Plotter { .. } => "Plotter",
            NodeKindDef::Process { .. } => "Process",
            NodeKindDef::Buffer { .. } => "Buffer",
            NodeKindDef::Splitter { .. } => "Splitter",
            NodeKindDef::Merge => "Merge",
            NodeKindDef::SinusSignal { .. } => "SinusSignal",
            NodeKindDef::LogicClamp { .. } => "LogicClamp",
            NodeKindDef::LogicInverter => "LogicInverter",
            NodeKindDef::Sensor { .. } => "Sensor",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FlowValueDef {
    pub quantity: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortValuesDef {
    #[serde(default)]
    pub inputs: Vec<FlowValueDef>,
    #[serde(default)]
    pub outputs: Vec<FlowValueDef>,
    #[serde(default)]
    pub logic_in: Option<f64>,
    #[serde(default)]
    pub logic_out: Option<f64>,
}

/// A flow port addressed by node index and port index within the node's
/// input or output list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node: usize,
    pub port: usize,
}

/// Output port `from` feeding input port `to`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FlowLinkDef {
    pub from: PortRef,
    pub to: PortRef,
}

/// Logic output of node `from` feeding the logic input of node `to`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LogicLinkDef {
    pub from: usize,
    pub to: usize,
}
