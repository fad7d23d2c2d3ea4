//! Portfolio snapshots and trend deltas.
//!
//! A snapshot is an immutable capture of the aggregate that a user chose to
//! save. The store keeps at most one; saving replaces it (last write wins).

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::logging::structured::LogContext;
use crate::risk::portfolio::PortfolioCounts;

/// Point-in-time capture of the portfolio aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub saved_at: DateTime<Utc>,
    pub total: u32,
    pub verified: u32,
    pub history_unknown: u32,
    pub not_registered: u32,
    pub stolen: u32,
    pub needs_recheck: u32,
    pub risk_score: u32,
}

impl PortfolioSnapshot {
    pub fn capture(counts: &PortfolioCounts, saved_at: DateTime<Utc>) -> Self {
        Self {
            saved_at,
            total: counts.total,
            verified: counts.verified,
            history_unknown: counts.history_unknown,
            not_registered: counts.not_registered,
            stolen: counts.stolen,
            needs_recheck: counts.needs_recheck,
            risk_score: counts.risk_score,
        }
    }
}

/// Change of one metric against a saved snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub diff: i64,
    /// `None` when the saved value was 0
    pub percent: Option<f64>,
}

impl MetricDelta {
    pub fn between(current: u32, previous: u32) -> Self {
        let diff = current as i64 - previous as i64;
        let percent = if previous == 0 {
            None
        } else {
            Some(diff as f64 / previous as f64 * 100.0)
        };
        Self { diff, percent }
    }
}

impl fmt::Display for MetricDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.diff > 0 { "+" } else { "" };
        write!(f, "Δ {}{}", sign, self.diff)?;
        if let Some(pct) = self.percent {
            let pct_sign = if pct > 0.0 { "+" } else { "" };
            write!(f, " ({}{:.1}%)", pct_sign, pct)?;
        }
        Ok(())
    }
}

/// Deltas for every snapshot metric. Each is `None` when no snapshot exists.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDeltas {
    pub total: Option<MetricDelta>,
    pub verified: Option<MetricDelta>,
    pub history_unknown: Option<MetricDelta>,
    pub not_registered: Option<MetricDelta>,
    pub stolen: Option<MetricDelta>,
    pub needs_recheck: Option<MetricDelta>,
    pub risk_score: Option<MetricDelta>,
}

impl SnapshotDeltas {
    pub fn compute(current: &PortfolioCounts, snapshot: Option<&PortfolioSnapshot>) -> Self {
        let Some(prev) = snapshot else {
            return Self::default();
        };

        Self {
            total: Some(MetricDelta::between(current.total, prev.total)),
            verified: Some(MetricDelta::between(current.verified, prev.verified)),
            history_unknown: Some(MetricDelta::between(
                current.history_unknown,
                prev.history_unknown,
            )),
            not_registered: Some(MetricDelta::between(
                current.not_registered,
                prev.not_registered,
            )),
            stolen: Some(MetricDelta::between(current.stolen, prev.stolen)),
            needs_recheck: Some(MetricDelta::between(current.needs_recheck, prev.needs_recheck)),
            risk_score: Some(MetricDelta::between(current.risk_score, prev.risk_score)),
        }
    }
}

/// Single-slot snapshot store.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RwLock<Option<PortfolioSnapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PortfolioSnapshot> {
        *self.slot.read()
    }

    /// Capture the live aggregate, replacing any earlier snapshot.
    pub fn save(
        &self,
        counts: &PortfolioCounts,
        now: DateTime<Utc>,
        ctx: &LogContext,
    ) -> PortfolioSnapshot {
        let snapshot = PortfolioSnapshot::capture(counts, now);
        *self.slot.write() = Some(snapshot);

        log::info!(
            "{} SNAPSHOT_SAVED saved_at={} total={} risk_score={}",
            ctx,
            snapshot.saved_at.to_rfc3339(),
            snapshot.total,
            snapshot.risk_score
        );
        snapshot
    }

    /// Restore a snapshot persisted by the host.
    pub fn restore(&self, snapshot: PortfolioSnapshot) {
        *self.slot.write() = Some(snapshot);
    }

    pub fn reset(&self, ctx: &LogContext) {
        *self.slot.write() = None;
        log::info!("{} SNAPSHOT_RESET", ctx);
    }

    pub fn deltas(&self, current: &PortfolioCounts) -> SnapshotDeltas {
        SnapshotDeltas::compute(current, self.current().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 8, 0, 0).unwrap()
    }

    fn counts_with_total(total: u32) -> PortfolioCounts {
        PortfolioCounts {
            total,
            verified: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_delta_with_percentage() {
        let delta = MetricDelta::between(12, 10);
        assert_eq!(delta.diff, 2);
        assert_eq!(delta.percent, Some(20.0));
        assert_eq!(delta.to_string(), "Δ +2 (+20.0%)");
    }

    #[test]
    fn test_delta_from_zero_has_no_percentage() {
        let delta = MetricDelta::between(3, 0);
        assert_eq!(delta.diff, 3);
        assert_eq!(delta.percent, None);
        assert_eq!(delta.to_string(), "Δ +3");
    }

    #[test]
    fn test_negative_and_flat_deltas() {
        assert_eq!(MetricDelta::between(5, 10).to_string(), "Δ -5 (-50.0%)");
        assert_eq!(MetricDelta::between(4, 4).to_string(), "Δ 0 (0.0%)");
    }

    #[test]
    fn test_no_snapshot_is_distinct_from_zero_prior() {
        let store = SnapshotStore::new();
        let ctx = LogContext::new("test-eval");

        let deltas = store.deltas(&counts_with_total(12));
        assert!(deltas.total.is_none());

        store.save(&PortfolioCounts::default(), at(1), &ctx);
        let deltas = store.deltas(&counts_with_total(12));
        assert_eq!(deltas.total, Some(MetricDelta { diff: 12, percent: None }));
    }

    #[test]
    fn test_save_then_compare() {
        let store = SnapshotStore::new();
        let ctx = LogContext::new("test-eval");

        store.save(&counts_with_total(10), at(1), &ctx);
        let deltas = store.deltas(&counts_with_total(12));
        assert_eq!(deltas.total.unwrap().to_string(), "Δ +2 (+20.0%)");
    }

    #[test]
    fn test_last_write_wins_and_reset() {
        let store = SnapshotStore::new();
        let ctx = LogContext::new("test-eval");

        store.save(&counts_with_total(10), at(1), &ctx);
        store.save(&counts_with_total(11), at(2), &ctx);
        let current = store.current().unwrap();
        assert_eq!(current.total, 11);
        assert_eq!(current.saved_at, at(2));

        store.reset(&ctx);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = PortfolioSnapshot::capture(&counts_with_total(4), at(3));
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["total"], 4);
        assert!(json.get("savedAt").is_some());
        assert!(json.get("historyUnknown").is_some());

        let back: PortfolioSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
