//! Pass-through taps: printer and plotter.

use std::collections::VecDeque;

use crate::error::{NodeError, NodeResult};
use crate::traits::{NodeEvent, NodeIo, NodeModel, PortLayout, TickContext, parse_number};
use fn_core::Real;

const TAP_LAYOUT: PortLayout = PortLayout {
    inputs: &["IN"],
    outputs: &["OUT"],
    logic_in: false,
    logic_out: false,
};

/// Passes its input through and reports it as a [`NodeEvent::Printed`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Printer;

impl Printer {
    pub const LAYOUT: PortLayout = TAP_LAYOUT;
}

impl NodeModel for Printer {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, _ctx: &TickContext) -> NodeResult<()> {
        let sample = io.input(0)?;
        io.set_output(0, sample)?;
        io.emit(NodeEvent::Printed(sample));
        Ok(())
    }
}

/// One point of a plotter's time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSample {
    /// Tick time (seconds since the driver started).
    pub time: Real,
    pub quantity: Real,
}

/// Passes its input through and records the input quantity over time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plotter {
    series: VecDeque<PlotSample>,
    /// Maximum retained samples; `None` keeps everything.
    capacity: Option<usize>,
}

impl Plotter {
    pub const LAYOUT: PortLayout = TAP_LAYOUT;

    /// Largest retained series length a plotter accepts.
    pub const MAX_CAPACITY: usize = 1_000_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Bounded plotter. `0` means unbounded, as for the `capacity` parameter;
    /// larger values are capped at [`Plotter::MAX_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series: VecDeque::new(),
            capacity: (capacity > 0).then(|| capacity.min(Self::MAX_CAPACITY)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Recorded samples, oldest first.
    pub fn series(&self) -> impl ExactSizeIterator<Item = &PlotSample> {
        self.series.iter()
    }

    /// Recorded quantities, oldest first.
    pub fn quantities(&self) -> Vec<Real> {
        self.series.iter().map(|s| s.quantity).collect()
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    fn push(&mut self, sample: PlotSample) {
        if let Some(cap) = self.capacity {
            while self.series.len() >= cap {
                self.series.pop_front();
            }
        }
        self.series.push_back(sample);
    }
}

impl NodeModel for Plotter {
    fn layout(&self) -> PortLayout {
        Self::LAYOUT
    }

    fn update(&mut self, io: &mut NodeIo, ctx: &TickContext) -> NodeResult<()> {
        let sample = io.input(0)?;
        io.set_output(0, sample)?;
        self.push(PlotSample {
            time: ctx.time,
            quantity: sample.quantity,
        });
        Ok(())
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![("capacity", self.capacity.unwrap_or(0).to_string())]
    }

    /// `capacity = 0` means unbounded.
    fn set_parameter(&mut self, name: &str, value: &str) -> NodeResult<()> {
        match name {
            "capacity" => {
                let cap = parse_number(name, value)?;
                if cap < 0.0 || cap.fract() != 0.0 {
                    return Err(NodeError::invalid(name, value, "must be a whole number"));
                }
                if cap > Self::MAX_CAPACITY as Real {
                    return Err(NodeError::invalid(name, value, "exceeds maximum plot capacity"));
                }
                self.capacity = if cap == 0.0 { None } else { Some(cap as usize) };
                if let Some(cap) = self.capacity {
                    while self.series.len() > cap {
                        self.series.pop_front();
                    }
                }
                Ok(())
            }
            _ => Err(NodeError::invalid(name, value, "unknown parameter")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FlowSample;

    fn io(sample: FlowSample) -> NodeIo {
        NodeIo {
            inputs: vec![sample],
            outputs: vec![FlowSample::default()],
            ..Default::default()
        }
    }

    #[test]
    fn printer_passes_through_and_emits() {
        let mut printer = Printer;
        let mut io = io(FlowSample::new(42.0, 2.0));
        printer.update(&mut io, &TickContext::default()).unwrap();
        assert_eq!(io.outputs[0], FlowSample::new(42.0, 2.0));
        assert_eq!(io.events, vec![NodeEvent::Printed(FlowSample::new(42.0, 2.0))]);
    }

    #[test]
    fn plotter_records_quantity_with_time() {
        let mut plotter = Plotter::new();
        for (t, q) in [(0.1, 10.0), (0.2, 11.0)] {
            let mut io = io(FlowSample::new(q, 1.0));
            plotter.update(&mut io, &TickContext::new(0.1, t)).unwrap();
            assert_eq!(io.outputs[0].quantity, q);
        }
        assert_eq!(plotter.quantities(), vec![10.0, 11.0]);
        assert_eq!(plotter.series().next().unwrap().time, 0.1);
    }

    #[test]
    fn plotter_capacity_drops_oldest() {
        let mut plotter = Plotter::with_capacity(2);
        for q in [1.0, 2.0, 3.0] {
            let mut io = io(FlowSample::new(q, 1.0));
            plotter.update(&mut io, &TickContext::default()).unwrap();
        }
        assert_eq!(plotter.quantities(), vec![2.0, 3.0]);

        plotter.set_parameter("capacity", "1").unwrap();
        assert_eq!(plotter.quantities(), vec![3.0]);
        assert!(plotter.set_parameter("capacity", "1.5").is_err());
    }

    #[test]
    fn zero_capacity_is_unbounded() {
        assert_eq!(Plotter::with_capacity(0), Plotter::new());
        assert_eq!(Plotter::with_capacity(0).capacity(), None);
        assert_eq!(
            Plotter::with_capacity(usize::MAX).capacity(),
            Some(Plotter::MAX_CAPACITY)
        );
    }

    #[test]
    fn oversized_capacity_rejected() {
        let mut plotter = Plotter::with_capacity(8);
        assert!(plotter.set_parameter("capacity", "1e18").is_err());
        assert_eq!(plotter.capacity(), Some(8));
        plotter.set_parameter("capacity", "1000000").unwrap();
        assert_eq!(plotter.capacity(), Some(Plotter::MAX_CAPACITY));
    }
}
