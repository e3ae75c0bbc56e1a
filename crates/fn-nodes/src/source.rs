//! Flow source with an optional logic-driven throttle.

use crate::error::{NodeError, NodeResult};
use crate::traits::{FlowSample, NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::Real;

/// Emits `max_quantity` (scaled by the logic input when linked) at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub max_quantity: Real,
    pub rate: Real,
}

impl Source {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &[],
        outputs: &["OUT"],
        logic_in: true,
        logic_out: false,
    };

    pub fn new(max_quantity: Real, rate: Real) -> Self {
        Self { max_quantity, rate }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::new(100.0, 1.0)
    }
}

impl NodeModel for Source {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let scalar = io.logic_input()?.scalar_or(1.0);
        io.set_output(0, FlowSample::new(self.max_quantity * scalar, self.rate))
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("maxQuantity", self.max_quantity.to_string()),
            ("rate", self.rate.to_string()),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "maxQuantity" | "value" => self.max_quantity = parse_number(name, value)?,
            "rate" | "speed" => self.rate = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LogicInput;

    fn io(logic: LogicInput) -> NodeIo {
        NodeIo {
            outputs: vec![FlowSample::default()],
            logic_in: Some(logic),
            ..Default::default()
        }
    }

    #[test]
    fn unlinked_logic_emits_full_quantity() {
        let mut source = Source::new(100.0, 1.0);
        let mut io = io(LogicInput::unlinked());
        source.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.outputs[0], FlowSample::new(100.0, 1.0));
    }

    #[test]
    fn linked_logic_scales_quantity() {
        let mut source = Source::new(100.0, 2.0);
        let mut io = io(LogicInput::linked(0.25));
        source.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.outputs[0], FlowSample::new(25.0, 2.0));
    }

    #[test]
    fn legacy_parameter_names_accepted() {
        let mut source = Source::default();
        source.set_parameter("value", "80").unwrap();
        source.set_parameter("speed", "3").unwrap();
        assert_eq!(source, Source::new(80.0, 3.0));
    }
}
