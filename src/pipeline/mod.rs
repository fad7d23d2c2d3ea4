//! View-model assembly.
//!
//! Ties the engine together for the two request shapes the host serves:
//! - `view` - a single machine's passport page (badge, narrative, passport, actions)
//! - `dashboard` - the insurer portfolio (alerts, counts, snapshot deltas)

pub mod context;
pub mod dashboard;
pub mod view;

pub use context::*;
pub use dashboard::*;
pub use view::*;
