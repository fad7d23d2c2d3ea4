//! Per-machine alert classification.
//!
//! Recomputed from scratch on every evaluation; nothing here is cached
//! beyond a single dashboard render.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, PriorityWeights};
use crate::logging::structured::LogContext;
use crate::risk::portfolio::PortfolioCounts;
use crate::status::CanonicalStatus;
use crate::storage::models::MachineRecord;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Reason a machine warrants insurer attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTag {
    Stolen,
    HistoryUnknown,
    NotRegistered,
    NeedsRecheck,
}

impl AlertTag {
    /// Status-derived tag, if the status carries one.
    pub fn for_status(status: CanonicalStatus) -> Option<AlertTag> {
        match status {
            CanonicalStatus::Stolen => Some(AlertTag::Stolen),
            CanonicalStatus::HistoryUnknown => Some(AlertTag::HistoryUnknown),
            CanonicalStatus::NotRegistered => Some(AlertTag::NotRegistered),
            CanonicalStatus::RegisteredVerified => None,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            AlertTag::Stolen => "Reported stolen / high risk",
            AlertTag::HistoryUnknown => "Legal history incomplete",
            AlertTag::NotRegistered => "No registry record found",
            AlertTag::NeedsRecheck => "Verification expired (> 180 days)",
        }
    }
}

/// Alert list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFilter {
    #[default]
    All,
    Tag(AlertTag),
}

/// A machine on the alert list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEntry {
    pub machine: MachineRecord,
    pub age_days: Option<i64>,
    pub needs_recheck: bool,
    pub tags: BTreeSet<AlertTag>,
    pub priority: u32,
}

impl AlertEntry {
    /// Human-readable reasons, one per tag.
    pub fn reasons(&self) -> Vec<&'static str> {
        self.tags.iter().map(AlertTag::reason).collect()
    }
}

/// Result of evaluating a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertReport {
    /// Tagged machines, highest priority first
    pub alerts: Vec<AlertEntry>,
    pub counts: PortfolioCounts,
}

impl AlertReport {
    /// Alerts carrying the selected tag, priority order preserved.
    pub fn filtered(&self, filter: AlertFilter) -> Vec<&AlertEntry> {
        filter_alerts(&self.alerts, filter)
    }
}

/// Entries carrying the selected tag, order preserved.
pub fn filter_alerts(alerts: &[AlertEntry], filter: AlertFilter) -> Vec<&AlertEntry> {
    alerts
        .iter()
        .filter(|a| match filter {
            AlertFilter::All => true,
            AlertFilter::Tag(tag) => a.tags.contains(&tag),
        })
        .collect()
}

/// Whole days between the last verification and `now`, floored.
///
/// `None` when the machine has no usable verification date.
pub fn age_days(last_verified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    last_verified_at.map(|verified| {
        (now - verified)
            .num_milliseconds()
            .div_euclid(MILLIS_PER_DAY)
    })
}

/// Strictly older than the threshold. Machines without a date never qualify.
pub fn needs_recheck(age_days: Option<i64>, threshold_days: i64) -> bool {
    age_days.map_or(false, |age| age > threshold_days)
}

/// Sum of the weights for each applicable indicator, saturating at `u32::MAX`.
pub fn priority_for(tags: &BTreeSet<AlertTag>, weights: &PriorityWeights) -> u32 {
    tags.iter()
        .map(|tag| match tag {
            AlertTag::Stolen => weights.stolen,
            AlertTag::HistoryUnknown => weights.history_unknown,
            AlertTag::NotRegistered => weights.not_registered,
            AlertTag::NeedsRecheck => weights.needs_recheck,
        })
        .fold(0u32, u32::saturating_add)
}

/// Portfolio alert evaluator.
#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    config: EngineConfig,
}

impl AlertEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify a single machine. Entries with no tags are still returned here;
    /// `evaluate` drops them from the alert list.
    pub fn classify(&self, machine: &MachineRecord, now: DateTime<Utc>) -> AlertEntry {
        let age = age_days(machine.last_verified_at, now);
        let recheck = needs_recheck(age, self.config.recheck_threshold_days);

        let mut tags = BTreeSet::new();
        if let Some(tag) = AlertTag::for_status(machine.status) {
            tags.insert(tag);
        }
        if recheck {
            tags.insert(AlertTag::NeedsRecheck);
        }

        let priority = priority_for(&tags, &self.config.priority);

        AlertEntry {
            machine: machine.clone(),
            age_days: age,
            needs_recheck: recheck,
            tags,
            priority,
        }
    }

    /// Evaluate a portfolio at `now`.
    pub fn evaluate(
        &self,
        records: &[MachineRecord],
        now: DateTime<Utc>,
        ctx: &LogContext,
    ) -> AlertReport {
        let classified: Vec<AlertEntry> = records.iter().map(|m| self.classify(m, now)).collect();

        let counts = PortfolioCounts::from_entries(&classified, &self.config.risk);

        let mut alerts: Vec<AlertEntry> = classified
            .into_iter()
            .filter(|entry| !entry.tags.is_empty())
            .collect();
        // stable: equal priorities keep input order
        alerts.sort_by(|a, b| b.priority.cmp(&a.priority));

        for entry in &alerts {
            log::debug!(
                "{} ALERT registry_id={} tags={:?} priority={} age_days={:?}",
                ctx,
                entry.machine.registry_id,
                entry.tags,
                entry.priority,
                entry.age_days
            );
        }

        log::info!(
            "{} ALERTS_EVALUATED total={} alerts={} stolen={} needs_recheck={} risk_score={}",
            ctx,
            counts.total,
            alerts.len(),
            counts.stolen,
            counts.needs_recheck,
            counts.risk_score
        );

        AlertReport { alerts, counts }
    }
}

/// Evaluate a portfolio with the default configuration.
pub fn evaluate(records: &[MachineRecord], now: DateTime<Utc>) -> AlertReport {
    AlertEngine::default().evaluate(records, now, &LogContext::new("evaluate"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap()
    }

    fn machine(id: &str, status: CanonicalStatus, age: i64) -> MachineRecord {
        MachineRecord::new(id, "Brand", "Model", status, Some(now() - Duration::days(age)))
    }

    fn tags(entry: &AlertEntry) -> Vec<AlertTag> {
        entry.tags.iter().copied().collect()
    }

    #[test]
    fn test_age_days_floors() {
        let verified = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 23, 59, 59).unwrap();
        assert_eq!(age_days(Some(verified), now), Some(1));

        // future verification dates floor towards negative infinity
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(age_days(Some(verified), now), Some(-1));

        assert_eq!(age_days(None, now), None);
    }

    #[test]
    fn test_recheck_threshold_is_strict() {
        assert!(!needs_recheck(Some(180), 180));
        assert!(needs_recheck(Some(181), 180));
        assert!(!needs_recheck(None, 180));
    }

    #[test]
    fn test_stolen_recent_has_only_stolen_tag() {
        let engine = AlertEngine::default();
        let entry = engine.classify(&machine("A", CanonicalStatus::Stolen, 10), now());
        assert_eq!(tags(&entry), vec![AlertTag::Stolen]);
        assert_eq!(entry.priority, 100);
    }

    #[test]
    fn test_verified_but_stale_needs_recheck_only() {
        let engine = AlertEngine::default();
        let entry = engine.classify(&machine("A", CanonicalStatus::RegisteredVerified, 200), now());
        assert_eq!(tags(&entry), vec![AlertTag::NeedsRecheck]);
        assert_eq!(entry.priority, 20);
        assert_eq!(entry.age_days, Some(200));
    }

    #[test]
    fn test_huge_configured_weights_saturate() {
        let weights = PriorityWeights {
            stolen: u32::MAX,
            needs_recheck: u32::MAX,
            ..Default::default()
        };
        let tags: BTreeSet<AlertTag> = [AlertTag::Stolen, AlertTag::NeedsRecheck].into();
        assert_eq!(priority_for(&tags, &weights), u32::MAX);

        let engine = AlertEngine::new(EngineConfig {
            priority: weights,
            ..Default::default()
        });
        let entry = engine.classify(&machine("A", CanonicalStatus::Stolen, 400), now());
        assert_eq!(entry.priority, u32::MAX);
    }

    #[test]
    fn test_not_registered_recent_priority_40() {
        let report = AlertEngine::default().evaluate(
            &[machine("A", CanonicalStatus::NotRegistered, 1)],
            now(),
            &LogContext::new("test-eval"),
        );
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].priority, 40);
    }

    #[test]
    fn test_clean_machines_excluded() {
        let report = AlertEngine::default().evaluate(
            &[
                machine("CLEAN", CanonicalStatus::RegisteredVerified, 5),
                machine("HU", CanonicalStatus::HistoryUnknown, 5),
            ],
            now(),
            &LogContext::new("test-eval"),
        );
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].machine.registry_id, "HU");
        assert_eq!(report.counts.total, 2);
        assert_eq!(report.counts.any, 1);
    }

    #[test]
    fn test_priority_order_and_stable_ties() {
        let records = vec![
            machine("HU-STALE", CanonicalStatus::HistoryUnknown, 400),
            machine("NR-1", CanonicalStatus::NotRegistered, 3),
            machine("STOLEN", CanonicalStatus::Stolen, 2),
            machine("NR-2", CanonicalStatus::NotRegistered, 4),
        ];
        let report = evaluate(&records, now());
        let order: Vec<&str> = report
            .alerts
            .iter()
            .map(|a| a.machine.registry_id.as_str())
            .collect();
        assert_eq!(order, vec!["STOLEN", "HU-STALE", "NR-1", "NR-2"]);
        assert_eq!(report.alerts[1].priority, 80);
    }

    #[test]
    fn test_filter_by_tag() {
        let records = vec![
            machine("S", CanonicalStatus::Stolen, 300),
            machine("V", CanonicalStatus::RegisteredVerified, 300),
            machine("H", CanonicalStatus::HistoryUnknown, 1),
        ];
        let report = evaluate(&records, now());
        assert_eq!(report.filtered(AlertFilter::All).len(), 3);

        let recheck: Vec<&str> = report
            .filtered(AlertFilter::Tag(AlertTag::NeedsRecheck))
            .iter()
            .map(|a| a.machine.registry_id.as_str())
            .collect();
        assert_eq!(recheck, vec!["S", "V"]);
    }

    #[test]
    fn test_reasons_follow_tags() {
        let entry = AlertEngine::default().classify(&machine("S", CanonicalStatus::Stolen, 300), now());
        assert_eq!(
            entry.reasons(),
            vec!["Reported stolen / high risk", "Verification expired (> 180 days)"]
        );
    }

    #[test]
    fn test_undated_machine_never_needs_recheck() {
        let record = MachineRecord::new("U", "B", "M", CanonicalStatus::RegisteredVerified, None);
        let report = evaluate(&[record], now());
        assert!(report.alerts.is_empty());
        assert_eq!(report.counts.needs_recheck, 0);
    }

    #[test]
    fn test_custom_weights() {
        let mut config = EngineConfig::default();
        config.priority.needs_recheck = 5;
        config.recheck_threshold_days = 30;
        let engine = AlertEngine::new(config);
        let entry = engine.classify(&machine("V", CanonicalStatus::RegisteredVerified, 31), now());
        assert_eq!(entry.priority, 5);
    }
}
