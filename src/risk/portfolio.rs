//! Portfolio aggregate.
//!
//! Status counts and the 0-100 portfolio risk score.

use serde::{Deserialize, Serialize};

use crate::config::RiskWeights;
use crate::risk::alerts::AlertEntry;
use crate::status::CanonicalStatus;

/// Live portfolio aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioCounts {
    pub total: u32,
    pub verified: u32,
    pub history_unknown: u32,
    pub not_registered: u32,
    pub stolen: u32,
    pub needs_recheck: u32,
    /// Machines with at least one alert tag
    pub any: u32,
    pub risk_score: u32,
}

impl PortfolioCounts {
    /// Aggregate classified entries (tagged or not).
    pub fn from_entries(entries: &[AlertEntry], weights: &RiskWeights) -> Self {
        let mut counts = PortfolioCounts::default();

        for entry in entries {
            counts.total += 1;
            match entry.machine.status {
                CanonicalStatus::RegisteredVerified => counts.verified += 1,
                CanonicalStatus::HistoryUnknown => counts.history_unknown += 1,
                CanonicalStatus::NotRegistered => counts.not_registered += 1,
                CanonicalStatus::Stolen => counts.stolen += 1,
            }
            if entry.needs_recheck {
                counts.needs_recheck += 1;
            }
            if !entry.tags.is_empty() {
                counts.any += 1;
            }
        }

        counts.risk_score = risk_score(&counts, weights);
        counts
    }
}

/// Weighted flag density scaled to 0-100.
///
/// `min(cap, round(weighted / max(1, total) * scale))`. An empty portfolio
/// scores 0.
pub fn risk_score(counts: &PortfolioCounts, weights: &RiskWeights) -> u32 {
    let weighted = counts.stolen as f64 * weights.stolen as f64
        + counts.history_unknown as f64 * weights.history_unknown as f64
        + counts.not_registered as f64 * weights.not_registered as f64
        + counts.needs_recheck as f64 * weights.needs_recheck as f64;

    let denominator = counts.total.max(1) as f64;
    let score = (weighted / denominator * weights.scale as f64).round();

    (score as u32).min(weights.cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(total: u32, stolen: u32, hu: u32, nr: u32, recheck: u32) -> PortfolioCounts {
        PortfolioCounts {
            total,
            stolen,
            history_unknown: hu,
            not_registered: nr,
            needs_recheck: recheck,
            verified: total - stolen - hu - nr,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_portfolio_scores_zero() {
        assert_eq!(risk_score(&PortfolioCounts::default(), &RiskWeights::default()), 0);
    }

    #[test]
    fn test_all_stolen_is_capped() {
        for n in [1, 3, 50] {
            assert_eq!(risk_score(&counts(n, n, 0, 0, 0), &RiskWeights::default()), 100);
        }
    }

    #[test]
    fn test_demo_portfolio_score() {
        // (4 + 2 + 1 + 1) / 4 * 20 = 40
        assert_eq!(risk_score(&counts(4, 1, 1, 1, 1), &RiskWeights::default()), 40);
    }

    #[test]
    fn test_rounding_half_up() {
        // 1 / 8 * 20 = 2.5
        assert_eq!(risk_score(&counts(8, 0, 0, 1, 0), &RiskWeights::default()), 3);
        // 1 / 3 * 20 = 6.67
        assert_eq!(risk_score(&counts(3, 0, 0, 1, 0), &RiskWeights::default()), 7);
    }
}
