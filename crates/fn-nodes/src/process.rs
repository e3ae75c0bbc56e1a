//! Heat process with a quantity window.

use crate::error::{NodeError, NodeResult};
use crate::formula::{delta_temperature, heat_loss};
use crate::traits::{FlowSample, NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::Real;

/// Adds `power` (scaled by the logic input when linked) to the stream.
///
/// - below `min_quantity` the heater is off and only passive loss applies
/// - above `max_quantity` the excess is additionally shed
/// - the bounds themselves count as inside the window
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub power: Real,
    pub min_quantity: Real,
    pub max_quantity: Real,
}

impl Process {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &["IN"],
        outputs: &["OUT"],
        logic_in: true,
        logic_out: false,
    };

    pub fn new(power: Real, min_quantity: Real, max_quantity: Real) -> Self {
        Self {
            power,
            min_quantity,
            max_quantity,
        }
    }

    /// Outlet quantity for a given inlet quantity and power scalar.
    pub fn outlet_quantity(&self, inlet: Real, scalar: Real) -> NodeResult<Real> {
        let loss = heat_loss(inlet);
        if inlet < self.min_quantity {
            return Ok(inlet - loss);
        }
        let gain = delta_temperature(self.power * scalar, 1.0)?;
        if inlet > self.max_quantity {
            Ok(inlet + gain - loss - (inlet - self.max_quantity))
        } else {
            Ok(inlet + gain - loss)
        }
    }
}

impl Default for Process {
    fn default() -> Self {
        Self::new(100.0, 0.0, 100.0)
    }
}

impl NodeModel for Process {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let scalar = io.logic_input()?.scalar_or(1.0);
        let inlet = io.input(0)?;
        let quantity = self.outlet_quantity(inlet.quantity, scalar)?;
        io.set_output(0, FlowSample::new(quantity, inlet.rate))
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("power", self.power.to_string()),
            ("minQuantity", self.min_quantity.to_string()),
            ("maxQuantity", self.max_quantity.to_string()),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "power" => self.power = parse_number(name, value)?,
            "minQuantity" => self.min_quantity = parse_number(name, value)?,
            "maxQuantity" => self.max_quantity = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}
