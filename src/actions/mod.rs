//! Call-to-action resolution.
//!
//! - `resolver` - status/role/tier driven action list
//! - `gate` - login redirect that preserves the original destination

pub mod gate;
pub mod resolver;

pub use gate::*;
pub use resolver::*;
