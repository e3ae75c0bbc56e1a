//! Expression-driven sensor.

use crate::error::{NodeError, NodeResult};
use crate::expr::{Bindings, Expression};
use crate::traits::{NodeIo, NodeModel, PortLayout, TickContext};
use fn_core::clamp;

/// Passes flow through and publishes `clamp(expression, 0, 1)` on its logic output.
///
/// The expression sees `temp` (inlet quantity) and `flowSpeed` (inlet rate).
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    expression: Expression,
}

impl Sensor {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &["IN"],
        outputs: &["OUT"],
        logic_in: false,
        logic_out: true,
    };

    pub const DEFAULT_EXPRESSION: &'static str = "temp / 100";

    pub fn new(source: &str) -> NodeResult<Self> {
        Ok(Self {
            expression: Expression::parse(source)?,
        })
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            expression: Expression::parse(Self::DEFAULT_EXPRESSION)
                .expect("default sensor expression parses"),
        }
    }
}

impl NodeModel for Sensor {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let inlet = io.input(0)?;
        let raw = self.expression.eval(&Bindings {
            temp: inlet.quantity,
            flow_speed: inlet.rate,
        })?;
        io.set_output(0, inlet)?;
        io.set_logic_output(clamp(raw, 0.0, 1.0))
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![("expression", self.expression.source().to_string())]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "expression" => self.expression = Expression::parse(value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}
