//! Storage module.
//!
//! Machine records and the repository that serves them.
//! Note: the actual backing store (file, ORM, client cache) is owned by the
//! host application. This module provides the ingestion boundary, source
//! precedence and portfolio queries.

pub mod models;
pub mod query;
pub mod repository;
pub mod seed;

pub use models::*;
pub use query::*;
pub use repository::*;
pub use seed::*;
