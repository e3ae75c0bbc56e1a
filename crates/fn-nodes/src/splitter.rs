//! Two-way flow splitter.

use crate::error::{NodeError, NodeResult};
use crate::formula::heat_loss;
use crate::traits::{FlowSample, NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::Real;

/// Divides the inlet rate between two outlets.
///
/// The fraction sent to `OUT1` is the logic value when linked, else
/// `split_ratio`; `OUT2` gets the remainder. Both carry the inlet quantity
/// minus passive loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Splitter {
    pub split_ratio: Real,
}

impl Splitter {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &["IN"],
        outputs: &["OUT1", "OUT2"],
        logic_in: true,
        logic_out: false,
    };

    pub fn new(split_ratio: Real) -> Self {
        Self { split_ratio }
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl NodeModel for Splitter {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let fraction = io.logic_input()?.scalar_or(self.split_ratio);
        let inlet = io.input(0)?;
        let quantity = inlet.quantity - heat_loss(inlet.quantity);
        io.set_output(0, FlowSample::new(quantity, inlet.rate * fraction))?;
        io.set_output(1, FlowSample::new(quantity, inlet.rate * (1.0 - fraction)))
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![("splitRatio", self.split_ratio.to_string())]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "splitRatio" | "splitScalar" => self.split_ratio = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}
