//! Public sighting reports for machines flagged as stolen.

pub mod report;

pub use report::*;
