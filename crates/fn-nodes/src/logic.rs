//! Logic-only nodes: oscillator, clamp, inverter.

use std::f64::consts::TAU;

use crate::error::{NodeError, NodeResult};
use crate::traits::{NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::{Real, clamp};

/// 0..1 oscillator driven by wall-clock time, not tick count.
#[derive(Debug, Clone, PartialEq)]
pub struct SinusSignal {
    /// Seconds per full cycle.
    pub period: Real,
}

impl SinusSignal {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &[],
        outputs: &[],
        logic_in: false,
        logic_out: true,
    };

    pub fn new(period: Real) -> Self {
        Self { period }
    }

    pub fn value_at(&self, time: Real) -> NodeResult<Real> {
        if self.period == 0.0 {
            return Err(NodeError::DivideByZero {
                what: "sinus period",
            });
        }
        Ok((time * TAU / self.period).sin() / 2.0 + 0.5)
    }
}

impl Default for SinusSignal {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl NodeModel for SinusSignal {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, ctx: &TickContext) -> NodeResult<()> {
        let value = self.value_at(ctx.time)?;
        io.set_logic_output(value)
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![("period", self.period.to_string())]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "period" => self.period = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}

const GATE_LAYOUT: PortLayout = PortLayout {
    inputs: &[],
    outputs: &[],
    logic_in: true,
    logic_out: true,
};

/// Limits a logic signal to `[min, max]`; outputs 0 when unlinked.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicClamp {
    pub min: Real,
    pub max: Real,
}

impl LogicClamp {
    pub const LAYOUT: PortLayout = GATE_LAYOUT;

    pub fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }
}

impl Default for LogicClamp {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl NodeModel for LogicClamp {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let input = io.logic_input()?;
        let value = if input.linked {
            clamp(input.value, self.min, self.max)
        } else {
            0.0
        };
        io.set_logic_output(value)
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("min", self.min.to_string()),
            ("max", self.max.to_string()),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "min" => self.min = parse_number(name, value)?,
            "max" => self.max = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}

/// Outputs `1 - input`; 0 when unlinked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicInverter;

impl LogicInverter {
    pub const LAYOUT: PortLayout = GATE_LAYOUT;
}

impl NodeModel for LogicInverter {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let input = io.logic_input()?;
        let value = if input.linked { 1.0 - input.value } else { 0.0 };
        io.set_logic_output(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LogicInput;

    fn gate_io(input: LogicInput) -> NodeIo {
        NodeIo {
            logic_in: Some(input),
            logic_out: Some(0.0),
            ..Default::default()
        }
    }

    #[test]
    fn sinus_quarter_period_is_peak() {
        let s = SinusSignal::new(4.0);
        assert!((s.value_at(0.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((s.value_at(1.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((s.value_at(3.0).unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn sinus_zero_period_is_error() {
        let mut s = SinusSignal::new(0.0);
        let mut io = NodeIo {
            logic_out: Some(0.7),
            ..Default::default()
        };
        assert!(s.update(&mut io, &TickContext::new(0.1, 1.0)).is_err());
        assert_eq!(io.logic_out, Some(0.7));
    }

    #[test]
    fn clamp_limits_linked_value() {
        let mut c = LogicClamp::new(0.2, 0.8);
        let mut io = gate_io(LogicInput::linked(0.95));
        c.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.logic_out, Some(0.8));

        let mut io = gate_io(LogicInput::unlinked());
        c.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.logic_out, Some(0.0));
    }

    #[test]
    fn inverter_flips_linked_value() {
        let mut inv = LogicInverter;
        let mut io = gate_io(LogicInput::linked(0.25));
        inv.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.logic_out, Some(0.75));

        let mut io = gate_io(LogicInput::unlinked());
        inv.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.logic_out, Some(0.0));
    }
}
