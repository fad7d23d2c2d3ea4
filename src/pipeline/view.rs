//! Machine view assembly.
//!
//! Status lookup, presentation, disclosure and actions for one registry id.

use serde::Serialize;

use crate::actions::{resolve_actions_logged, ActionDescriptor};
use crate::passport::disclosure::DisclosureEngine;
use crate::passport::types::Passport;
use crate::pipeline::context::EvaluationContext;
use crate::status::{narrative_for, CanonicalStatus, StatusBadge, StatusNarrative};
use crate::storage::repository::MachineRepository;

/// Everything a passport page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineView {
    pub registry_id: String,
    pub found: bool,
    pub badge: StatusBadge,
    pub narrative: StatusNarrative,
    pub passport: Passport,
    pub actions: Vec<ActionDescriptor>,
}

impl MachineView {
    pub fn status(&self) -> CanonicalStatus {
        self.badge.status
    }
}

/// Build the view for `registry_id`. An unknown id renders as a
/// `NotRegistered` machine.
pub fn build_machine_view<R: MachineRepository + ?Sized>(
    ctx: &EvaluationContext,
    repo: &R,
    registry_id: &str,
) -> MachineView {
    let registry_id = registry_id.trim();
    let log_ctx = ctx.log_context().with_registry(registry_id);
    let record = repo.find(registry_id);

    let passport = DisclosureEngine::new(&ctx.config).build(
        registry_id,
        record.as_ref(),
        ctx.viewer.tier,
        &log_ctx,
    );
    let status = passport.status();
    let case_id = record.as_ref().and_then(|m| m.case_id.as_deref());
    let actions = resolve_actions_logged(registry_id, status, &ctx.viewer, case_id, &log_ctx);

    MachineView {
        registry_id: passport.registry_id().to_string(),
        found: record.is_some(),
        badge: StatusBadge::from(status),
        narrative: narrative_for(status),
        passport,
        actions,
    }
}
