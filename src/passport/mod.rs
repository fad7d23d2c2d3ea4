//! Equipment passport.
//!
//! Tiered disclosure of a machine's record plus the signed export handed out
//! by the download action.

pub mod disclosure;
pub mod export;
pub mod types;

pub use disclosure::*;
pub use export::*;
pub use types::*;
