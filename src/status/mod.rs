//! Status classification.
//!
//! Two layers:
//! - `normalize` - the single ingestion boundary from free-form upstream
//!   status strings to the closed `CanonicalStatus` enum
//! - `presentation` - badge metadata (label, tone) and public narrative text

pub mod normalize;
pub mod presentation;

pub use normalize::*;
pub use presentation::*;
