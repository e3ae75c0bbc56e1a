//! Core traits and per-tick I/O records for node models.

use crate::error::{NodeError, NodeResult};
use crate::formula::check_finite;
use fn_core::Real;

/// Quantity/rate pair carried by a flow port.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowSample {
    pub quantity: Real,
    pub rate: Real,
}

impl FlowSample {
    pub fn new(quantity: Real, rate: Real) -> Self {
        Self { quantity, rate }
    }
}

/// Value of a node's logic input after port propagation.
///
/// `linked == false` means no peer was connected this tick; `value` is then 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicInput {
    pub value: Real,
    pub linked: bool,
}

impl LogicInput {
    pub fn linked(value: Real) -> Self {
        Self {
            value,
            linked: true,
        }
    }

    pub fn unlinked() -> Self {
        Self::default()
    }

    /// The logic value if linked, else `fallback`.
    pub fn scalar_or(&self, fallback: Real) -> Real {
        if self.linked { self.value } else { fallback }
    }
}

/// Timing inputs for one tick, computed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    /// Seconds since the previous tick.
    pub elapsed: Real,
    /// Seconds since the driver started.
    pub time: Real,
}

impl TickContext {
    pub fn new(elapsed: Real, time: Real) -> Self {
        Self { elapsed, time }
    }
}

/// Side effects a node reports to whoever drives the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// A printer observed this input sample.
    Printed(FlowSample),
}

/// Which ports a node type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
    pub logic_in: bool,
    pub logic_out: bool,
}

/// Port values handed to a node's update.
///
/// Inputs hold this tick's propagated values; outputs and `logic_out` hold
/// the node's previous values and are only published if the update succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIo {
    pub inputs: Vec<FlowSample>,
    pub outputs: Vec<FlowSample>,
    pub logic_in: Option<LogicInput>,
    pub logic_out: Option<Real>,
    pub events: Vec<NodeEvent>,
}

impl NodeIo {
    pub fn input(&self, index: usize) -> NodeResult<FlowSample> {
        self.inputs.get(index).copied().ok_or(NodeError::Layout {
            what: "missing flow input",
        })
    }

    /// Write an output after checking both components are finite.
    pub fn set_output(&mut self, index: usize, sample: FlowSample) -> NodeResult<()> {
        check_finite(sample.quantity, "output quantity")?;
        check_finite(sample.rate, "output rate")?;
        let slot = self.outputs.get_mut(index).ok_or(NodeError::Layout {
            what: "missing flow output",
        })?;
        *slot = sample;
        Ok(())
    }

    pub fn logic_input(&self) -> NodeResult<LogicInput> {
        self.logic_in.ok_or(NodeError::Layout {
            what: "missing logic input",
        })
    }

    pub fn set_logic_output(&mut self, value: Real) -> NodeResult<()> {
        check_finite(value, "logic output")?;
        let slot = self.logic_out.as_mut().ok_or(NodeError::Layout {
            what: "missing logic output",
        })?;
        *slot = value;
        Ok(())
    }

    pub fn emit(&mut self, event: NodeEvent) {
        self.events.push(event);
    }
}

/// Behaviour shared by every node type.
///
/// Implementations are deterministic functions of their parameters, carried
/// state, the propagated inputs and the tick context.
pub trait NodeModel {
    /// Ports this node type carries.
    fn layout(&self) -> PortLayout;

    /// Run the type-specific transfer function.
    ///
    /// On error the caller discards `io.outputs`/`io.logic_out`, so the node
    /// keeps publishing its previous values. Implementations must not commit
    /// carried state before every fallible step has succeeded.
    fn update(&mut self, io: &mut NodeIo, ctx: &TickContext) -> NodeResult<()>;

    /// Editable parameters as (name, value) pairs.
    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Set a parameter from its textual value.
    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        Err(NodeError::invalid(name, value, "unknown parameter"))
    }
}

/// Parse a numeric parameter value.
pub fn parse_number(name: &str, value: &str) -> NodeResult<Real> {
    let parsed: Real = value
        .trim()
        .parse()
        .map_err(|_| NodeError::invalid(name, value, "not a number"))?;
    if !parsed.is_finite() {
        return Err(NodeError::invalid(name, value, "must be finite"));
    }
    Ok(parsed)
}
