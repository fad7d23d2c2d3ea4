//! Insurer dashboard assembly.

use serde::Serialize;

use crate::pipeline::context::EvaluationContext;
use crate::risk::alerts::{filter_alerts, AlertEngine, AlertEntry, AlertFilter, AlertReport};
use crate::risk::portfolio::PortfolioCounts;
use crate::risk::snapshot::{PortfolioSnapshot, SnapshotDeltas, SnapshotStore};
use crate::storage::repository::MachineRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub alerts: Vec<AlertEntry>,
    pub counts: PortfolioCounts,
    pub snapshot: Option<PortfolioSnapshot>,
    pub deltas: SnapshotDeltas,
}

impl Dashboard {
    pub fn filtered(&self, filter: AlertFilter) -> Vec<&AlertEntry> {
        filter_alerts(&self.alerts, filter)
    }
}

/// Evaluate the repository's active records and compare against the saved
/// snapshot, if any.
pub fn build_dashboard<R: MachineRepository + ?Sized>(
    ctx: &EvaluationContext,
    repo: &R,
    snapshots: &SnapshotStore,
) -> Dashboard {
    let records = repo.all();
    let AlertReport { alerts, counts } =
        AlertEngine::new(ctx.config.clone()).evaluate(&records, ctx.now, &ctx.log_context());

    Dashboard {
        alerts,
        counts,
        snapshot: snapshots.current(),
        deltas: snapshots.deltas(&counts),
    }
}
