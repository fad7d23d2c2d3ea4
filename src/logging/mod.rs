//! Structured logging with evaluation context.
//!
//! Every log line carries the evaluation id (and the registry id when one is
//! in scope) so a single page render or dashboard refresh can be correlated.

pub mod structured;

pub use structured::*;
