//! Risk & alert engine.
//!
//! Runs over a batch of machine records for the insurer dashboards:
//! - `alerts` - per-machine tags, priority and the ordered alert list
//! - `portfolio` - status counts and the aggregate risk score
//! - `snapshot` - saved aggregates and trend deltas

pub mod alerts;
pub mod portfolio;
pub mod snapshot;

pub use alerts::*;
pub use portfolio::*;
pub use snapshot::*;
