//! Headless fixed-step runner.

use fn_nodes::{FlowSample, TickContext};

use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::tick::TickReport;

/// Options for headless runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed elapsed time per tick (seconds)
    pub dt: f64,
    /// Number of ticks to run
    pub ticks: usize,
    /// Record every N-th tick (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            ticks: 100,
            record_every: 1,
        }
    }
}

/// Output port values sampled during a run, in tick order of nodes.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Tick times (seconds)
    pub t: Vec<f64>,
    /// Every node's output samples at each recorded time
    pub outputs: Vec<Vec<FlowSample>>,
    /// Total events emitted
    pub events: usize,
    /// Total node errors reported
    pub errors: usize,
}

/// Run `opts.ticks` ticks with a fixed `dt`.
pub fn run_ticks(network: &mut Network, opts: &SimOptions) -> EngineResult<SimRecord> {
    run_ticks_with(network, opts, |_, _, _| {})
}

/// Like [`run_ticks`], calling `on_tick(step, ctx, report)` after every tick.
pub fn run_ticks_with<F>(
    network: &mut Network,
    opts: &SimOptions,
    mut on_tick: F,
) -> EngineResult<SimRecord>
where
    F: FnMut(usize, &TickContext, &TickReport),
{
    if opts.dt <= 0.0 || !opts.dt.is_finite() {
        return Err(EngineError::InvalidArg {
            what: "dt must be positive and finite",
        });
    }
    if opts.record_every == 0 {
        return Err(EngineError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let mut record = SimRecord::default();
    for step in 1..=opts.ticks {
        let ctx = TickContext::new(opts.dt, step as f64 * opts.dt);
        let report = network.tick(&ctx);
        record.events += report.events.len();
        record.errors += report.errors.len();
        on_tick(step, &ctx, &report);

        if step % opts.record_every == 0 || step == opts.ticks {
            record.t.push(ctx.time);
            record.outputs.push(snapshot(network));
        }
    }
    Ok(record)
}

fn snapshot(network: &Network) -> Vec<FlowSample> {
    network
        .nodes()
        .flat_map(|node| node.outputs().iter())
        .filter_map(|port| network.flow_sample(*port))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt, 0.1);
        assert_eq!(opts.ticks, 100);
        assert_eq!(opts.record_every, 1);
    }

    #[test]
    fn invalid_options_rejected() {
        let mut net = Network::new();
        let opts = SimOptions {
            dt: 0.0,
            ..Default::default()
        };
        assert!(run_ticks(&mut net, &opts).is_err());
        let opts = SimOptions {
            record_every: 0,
            ..Default::default()
        };
        assert!(run_ticks(&mut net, &opts).is_err());
    }

    #[test]
    fn decimation_keeps_final_tick() {
        let mut net = Network::new();
        net.add_node("Source", &[]).unwrap();
        let opts = SimOptions {
            dt: 0.5,
            ticks: 5,
            record_every: 2,
        };
        let record = run_ticks(&mut net, &opts).unwrap();
        assert_eq!(record.t, vec![1.0, 2.0, 2.5]);
        assert_eq!(record.outputs[0], vec![FlowSample::new(100.0, 1.0)]);
    }
}
