//! Error types.
//!
//! The decision engine itself is total; these errors only surface at the
//! edges (loading records, intake of reports, credentials, exports, config).

use thiserror::Error;

/// Failures loading or mutating machine records.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to parse machine records: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown registry id: {0}")]
    UnknownRegistryId(String),
}

/// Rejected sighting reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SightingError {
    #[error("Missing registryId")]
    MissingRegistryId,
}

/// Malformed stored credential hashes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("unsupported credential scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed credential hash: {0}")]
    Malformed(String),
}

/// Passport export signing and verification failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("content hash mismatch")]
    HashMismatch,

    #[error("failed to serialize passport: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Engine configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid engine config: {0}")]
    Invalid(String),
}
