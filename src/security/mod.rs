//! Security module.
//!
//! Threat scanning for publicly submitted text, and credential handling.

pub mod credentials;
pub mod sanitizer;

pub use credentials::*;
pub use sanitizer::*;
