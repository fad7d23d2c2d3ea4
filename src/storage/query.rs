//! Portfolio table queries.
//!
//! Filtering and sorting for the insurer machines table.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::alerts::{age_days, needs_recheck};
use crate::status::CanonicalStatus;
use crate::storage::models::MachineRecord;

/// Column to sort the machines table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    RegistryId,
    Brand,
    Country,
    Status,
    #[default]
    LastVerifiedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Machines table filter. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineQuery {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<CanonicalStatus>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub needs_recheck_only: bool,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl MachineQuery {
    fn matches(&self, m: &MachineRecord, now: DateTime<Utc>, threshold_days: i64) -> bool {
        let matches_text = match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                [
                    Some(m.registry_id.as_str()),
                    Some(m.brand.as_str()),
                    Some(m.model.as_str()),
                    m.owner.as_deref(),
                    m.policy_number.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&q))
            }
        };

        let matches_status = self.status.map_or(true, |s| m.status == s);
        let matches_country = self
            .country
            .as_deref()
            .map_or(true, |c| m.country.as_deref() == Some(c));
        let matches_recheck = !self.needs_recheck_only
            || needs_recheck(age_days(m.last_verified_at, now), threshold_days);

        matches_text && matches_status && matches_country && matches_recheck
    }

    /// Apply the filter and sort to a record set.
    pub fn apply(
        &self,
        records: &[MachineRecord],
        now: DateTime<Utc>,
        threshold_days: i64,
    ) -> Vec<MachineRecord> {
        let mut rows: Vec<MachineRecord> = records
            .iter()
            .filter(|m| self.matches(m, now, threshold_days))
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let ordering = compare_by(self.sort_key, a, b);
            match self.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        rows
    }
}

fn compare_by(key: SortKey, a: &MachineRecord, b: &MachineRecord) -> Ordering {
    match key {
        SortKey::RegistryId => a.registry_id.cmp(&b.registry_id),
        SortKey::Brand => a.brand.cmp(&b.brand),
        SortKey::Country => a.country.cmp(&b.country),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        // unknown dates sort as oldest
        SortKey::LastVerifiedAt => a.last_verified_at.cmp(&b.last_verified_at),
    }
}

/// Distinct countries in the portfolio, sorted.
pub fn countries(records: &[MachineRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|m| m.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
