//! Mixing tank with carried internal quantity.

use crate::error::{NodeError, NodeResult};
use crate::formula::{AMBIENT_TEMPERATURE, check_finite, heat_loss};
use crate::traits::{FlowSample, NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::Real;

/// Well-mixed tank of fixed `capacity`.
///
/// Each tick the inflow volume `rate * elapsed` mixes with the tank contents:
/// `q' = (v_in * q_in + q * capacity) / (v_in + capacity)`.
/// The outlet carries the tank quantity minus passive loss at the inlet rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    /// Kept for parity with the editor's parameter table; not used by the mixing law.
    pub max_quantity: Real,
    pub capacity: Real,
    /// Quantity held in the tank, carried across ticks.
    pub internal_quantity: Real,
}

impl Buffer {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &["IN"],
        outputs: &["OUT"],
        logic_in: false,
        logic_out: false,
    };

    pub fn new(max_quantity: Real, capacity: Real) -> Self {
        Self {
            max_quantity,
            capacity,
            internal_quantity: AMBIENT_TEMPERATURE,
        }
    }

    /// Tank quantity after mixing in `inlet` over `elapsed` seconds.
    pub fn mixed_quantity(&self, inlet: FlowSample, elapsed: Real) -> NodeResult<Real> {
        let volume_in = inlet.rate * elapsed;
        let total = volume_in + self.capacity;
        if total == 0.0 {
            return Err(NodeError::DivideByZero {
                what: "buffer volume",
            });
        }
        check_finite(
            (volume_in * inlet.quantity + self.internal_quantity * self.capacity) / total,
            "buffer quantity",
        )
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(100.0, 10.0)
    }
}

impl NodeModel for Buffer {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, ctx: &TickContext) -> NodeResult<()> {
        let inlet = io.input(0)?;
        let mixed = self.mixed_quantity(inlet, ctx.elapsed)?;
        io.set_output(0, FlowSample::new(mixed - heat_loss(mixed), inlet.rate))?;
        self.internal_quantity = mixed;
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("maxQuantity", self.max_quantity.to_string()),
            ("capacity", self.capacity.to_string()),
            ("internalQuantity", self.internal_quantity.to_string()),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "maxQuantity" => self.max_quantity = parse_number(name, value)?,
            "capacity" => {
                let capacity = parse_number(name, value)?;
                if capacity < 0.0 {
                    return Err(NodeError::invalid(name, value, "must be non-negative"));
                }
                self.capacity = capacity;
            }
            "internalQuantity" => self.internal_quantity = parse_number(name, value)?,
            _ => return Err(NodeError::invalid(name, value, "unknown parameter")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step(buffer: &mut Buffer, inlet: FlowSample, elapsed: Real) -> NodeResult<FlowSample> {
        let mut io = NodeIo {
            inputs: vec![inlet],
            outputs: vec![FlowSample::default()],
            ..Default::default()
        };
        buffer.update(&mut io, &TickContext::new(elapsed, 0.0))?;
        Ok(io.outputs[0])
    }

    #[test]
    fn mixing_law() {
        let mut b = Buffer::new(100.0, 10.0);
        b.internal_quantity = 20.0;
        // v_in = 2 * 5 = 10 -> (10*80 + 20*10) / 20 = 50
        let out = step(&mut b, FlowSample::new(80.0, 2.0), 5.0).unwrap();
        assert!((b.internal_quantity - 50.0).abs() < 1e-12);
        assert!((out.quantity - (50.0 - heat_loss(50.0))).abs() < 1e-12);
        assert_eq!(out.rate, 2.0);
    }

    #[test]
    fn zero_elapsed_holds_tank() {
        let mut b = Buffer::new(100.0, 10.0);
        step(&mut b, FlowSample::new(80.0, 2.0), 0.0).unwrap();
        assert_eq!(b.internal_quantity, AMBIENT_TEMPERATURE);
    }

    #[test]
    fn empty_tank_with_no_inflow_is_divide_by_zero() {
        let mut b = Buffer::new(100.0, 0.0);
        let err = step(&mut b, FlowSample::new(80.0, 0.0), 1.0).unwrap_err();
        assert!(matches!(err, NodeError::DivideByZero { .. }));
        assert_eq!(b.internal_quantity, AMBIENT_TEMPERATURE);
    }

    proptest! {
        #[test]
        fn converges_monotonically_to_held_input(
            q in -50.0..150.0f64,
            start in -50.0..150.0f64,
            rate in 0.1..10.0f64,
            elapsed in 0.01..1.0f64,
        ) {
            let mut b = Buffer::new(100.0, 10.0);
            b.internal_quantity = start;
            let mut gap = (start - q).abs();
            for _ in 0..200 {
                step(&mut b, FlowSample::new(q, rate), elapsed).unwrap();
                let next_gap = (b.internal_quantity - q).abs();
                prop_assert!(next_gap <= gap + 1e-9);
                gap = next_gap;
            }
            let first_gap = (start - q).abs();
            prop_assert!(gap < first_gap || first_gap < 1e-9);
        }
    }
}
