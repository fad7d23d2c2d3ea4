//! Status normalization.
//!
//! Maps heterogeneous upstream status strings (seed files, ORM rows, client
//! caches, insurance feeds) onto the four canonical registry statuses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four registry classifications a machine can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
    RegisteredVerified,
    HistoryUnknown,
    NotRegistered,
    Stolen,
}

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 4] = [
        CanonicalStatus::RegisteredVerified,
        CanonicalStatus::HistoryUnknown,
        CanonicalStatus::NotRegistered,
        CanonicalStatus::Stolen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::RegisteredVerified => "REGISTERED_VERIFIED",
            CanonicalStatus::HistoryUnknown => "HISTORY_UNKNOWN",
            CanonicalStatus::NotRegistered => "NOT_REGISTERED",
            CanonicalStatus::Stolen => "STOLEN",
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known upstream spellings, compared after trim + uppercase.
const STATUS_TOKENS: &[(&str, CanonicalStatus)] = &[
    ("REGISTERED_VERIFIED", CanonicalStatus::RegisteredVerified),
    ("VERIFIED", CanonicalStatus::RegisteredVerified),
    ("REGISTERED", CanonicalStatus::RegisteredVerified),
    ("REGISTERED & VERIFIED", CanonicalStatus::RegisteredVerified),
    ("HISTORY_UNKNOWN", CanonicalStatus::HistoryUnknown),
    ("HISTORY UNKNOWN", CanonicalStatus::HistoryUnknown),
    ("HISTORY-UNKNOWN", CanonicalStatus::HistoryUnknown),
    ("UNKNOWN", CanonicalStatus::HistoryUnknown),
    ("NOT_REGISTERED", CanonicalStatus::NotRegistered),
    ("NOT REGISTERED", CanonicalStatus::NotRegistered),
    ("NOT-REGISTERED", CanonicalStatus::NotRegistered),
    ("UNREGISTERED", CanonicalStatus::NotRegistered),
    ("STOLEN", CanonicalStatus::Stolen),
    ("STOLEN / RED FLAG", CanonicalStatus::Stolen),
    ("RED FLAG", CanonicalStatus::Stolen),
    ("RED_FLAG", CanonicalStatus::Stolen),
];

/// Normalize a raw status string.
///
/// Total over all inputs. Anything unrecognized, including empty or absent
/// input, resolves to `NotRegistered` so a typo can never promote a machine
/// to a higher-trust status.
///
/// # Examples
/// ```
/// use equipregistry_core::status::{normalize_status, CanonicalStatus};
///
/// assert_eq!(normalize_status(Some(" stolen / red flag ")), CanonicalStatus::Stolen);
/// assert_eq!(normalize_status(Some("Verified")), CanonicalStatus::RegisteredVerified);
/// assert_eq!(normalize_status(None), CanonicalStatus::NotRegistered);
/// ```
pub fn normalize_status(raw: Option<&str>) -> CanonicalStatus {
    let token = raw.unwrap_or("").trim().to_uppercase();

    match STATUS_TOKENS.iter().find(|(known, _)| *known == token) {
        Some((_, status)) => *status,
        None => {
            if !token.is_empty() {
                log::debug!("STATUS_UNRECOGNIZED token={:?} fallback=NOT_REGISTERED", token);
            }
            CanonicalStatus::NotRegistered
        }
    }
}
