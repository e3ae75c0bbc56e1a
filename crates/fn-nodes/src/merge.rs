//! Two-way flow merge.

use crate::error::{NodeError, NodeResult};
use crate::formula::{check_finite, heat_loss};
use crate::traits::{FlowSample, NodeIo, NodeModel, PortLayout, TickContext};
use fn_core::Real;

/// Joins two streams into their flow-weighted mix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Merge;

impl Merge {
    pub const LAYOUT: PortLayout = PortLayout {
        inputs: &["IN1", "IN2"],
        outputs: &["OUT"],
        logic_in: false,
        logic_out: false,
    };

    /// Flow-weighted average of the two inlets, before passive loss.
    pub fn mixed(a: FlowSample, b: FlowSample) -> NodeResult<FlowSample> {
        let rate: Real = a.rate + b.rate;
        if rate == 0.0 {
            return Err(NodeError::DivideByZero {
                what: "merge combined rate",
            });
        }
        let quantity = check_finite(
            (a.rate * a.quantity + b.rate * b.quantity) / rate,
            "merge quantity",
        )?;
        Ok(FlowSample::new(quantity, rate))
    }
}

impl NodeModel for Merge {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let mix = Self::mixed(io.input(0)?, io.input(1)?)?;
        io.set_output(
            0,
            FlowSample::new(mix.quantity - heat_loss(mix.quantity), mix.rate),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn weighted_average_then_loss() {
        let mut merge = Merge;
        let mut io = NodeIo {
            inputs: vec![FlowSample::new(100.0, 2.0), FlowSample::new(50.0, 1.0)],
            outputs: vec![FlowSample::default()],
            ..Default::default()
        };
        merge.update(&mut io, &TickContext::default()).unwrap();
        let mix = 250.0 / 3.0;
        assert!((io.outputs[0].quantity - (mix - heat_loss(mix))).abs() < 1e-9);
        assert!((io.outputs[0].quantity - 80.1667).abs() < 1e-3);
        assert_eq!(io.outputs[0].rate, 3.0);
    }

    #[test]
    fn zero_combined_rate_is_divide_by_zero() {
        let err = Merge::mixed(FlowSample::new(10.0, 0.0), FlowSample::new(20.0, 0.0)).unwrap_err();
        assert!(matches!(err, NodeError::DivideByZero { .. }));
    }

    proptest! {
        #[test]
        fn equal_rates_commute(t1 in -100.0..200.0f64, t2 in -100.0..200.0f64, r in 0.01..100.0f64) {
            let ab = Merge::mixed(FlowSample::new(t1, r), FlowSample::new(t2, r)).unwrap();
            let ba = Merge::mixed(FlowSample::new(t2, r), FlowSample::new(t1, r)).unwrap();
            prop_assert!((ab.quantity - (t1 + t2) / 2.0).abs() < 1e-9);
            prop_assert!((ab.quantity - ba.quantity).abs() < 1e-12);
        }
    }
}
