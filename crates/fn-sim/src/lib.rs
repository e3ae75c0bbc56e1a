//! Tick engine for flownet networks.
//!
//! Provides:
//! - [`Network`]: ordered node arena over a port graph, with the topology
//!   mutation and observation API
//! - [`Network::tick`]: single-pass, fixed-order update with base port propagation
//! - [`TickClock`] for wall-clock drivers and [`run_ticks`] for fixed-step runs
//! - [`SharedNetwork`] and [`TickLoop`] for ticking on a background thread
//!
//! # Example
//!
//! ```
//! use fn_nodes::TickContext;
//! use fn_sim::Network;
//!
//! let mut net = Network::new();
//! let source = net.add_node("Source", &[]).unwrap();
//! let process = net.add_node("Process", &[]).unwrap();
//! net.connect(source, "OUT", process, "IN").unwrap();
//!
//! net.tick(&TickContext::new(0.1, 0.1));
//! let out = net.port_by_label(process, "OUT").unwrap();
//! assert!((net.flow_sample(out).unwrap().quantity - 119.92).abs() < 0.01);
//! ```

pub mod clock;
pub mod error;
pub mod network;
pub mod node;
pub mod shared;
pub mod sim;
pub mod tick;

// Re-exports for public API
pub use clock::TickClock;
pub use error::{EngineError, EngineResult};
pub use network::Network;
pub use node::{Node, Position};
pub use shared::{SharedNetwork, TickLoop};
pub use sim::{SimOptions, SimRecord, run_ticks, run_ticks_with};
pub use tick::TickReport;
