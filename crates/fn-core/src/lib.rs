//! fn-core: stable foundation for flownet.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact handles for nodes and ports)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
