//! fn-nodes: node catalogue for flownet.
//!
//! Provides the transfer functions for every node type:
//! - Flow sources, taps (printer, plotter) and the heat process
//! - Buffer tank with carried state, splitter and merge
//! - Logic nodes (sinus oscillator, clamp, inverter) and the expression sensor
//!
//! Each type is a plain struct implementing [`NodeModel`]; [`NodeKind`] is the
//! closed set of them. Nodes never touch the port graph: they see a
//! [`NodeIo`] snapshot prepared by the network and publish into it.
//!
//! # Example
//!
//! ```
//! use fn_nodes::{FlowSample, LogicInput, NodeIo, NodeKind, TickContext};
//!
//! let mut process = NodeKind::from_type_name("Process").unwrap();
//! let mut io = NodeIo {
//!     inputs: vec![FlowSample::new(100.0, 1.0)],
//!     outputs: vec![FlowSample::default()],
//!     logic_in: Some(LogicInput::unlinked()),
//!     ..Default::default()
//! };
//! process.update(&mut io, &TickContext::default()).unwrap();
//! assert!((io.outputs[0].quantity - 119.92).abs() < 0.01);
//! ```

pub mod buffer;
pub mod error;
pub mod expr;
pub mod formula;
pub mod kind;
pub mod logic;
pub mod merge;
pub mod process;
pub mod sensor;
pub mod source;
pub mod splitter;
pub mod tap;
pub mod traits;

// Re-exports
pub use buffer::Buffer;
pub use error::{NodeError, NodeResult};
pub use expr::{ExprError, Expression};
pub use formula::{delta_temperature, heat_loss};
pub use kind::NodeKind;
pub use logic::{LogicClamp, LogicInverter, SinusSignal};
pub use merge::Merge;
pub use process::Process;
pub use sensor::Sensor;
pub use source::Source;
pub use splitter::Splitter;
pub use tap::{PlotSample, Plotter, Printer};
pub use traits::{
    FlowSample, LogicInput, NodeEvent, NodeIo, NodeModel, PortLayout, TickContext,
};
