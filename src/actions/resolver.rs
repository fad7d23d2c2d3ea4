//! Action resolver.
//!
//! Rules are cumulative: every rule that matches contributes its actions, in
//! rule order. Visibility never depends on authentication; for anonymous
//! viewers the destination of a login-required action is routed through the
//! login gate instead.

use serde::{Deserialize, Serialize};

use crate::actions::gate::login_gate;
use crate::logging::structured::LogContext;
use crate::passport::types::DisclosureTier;
use crate::security::credentials::Role;
use crate::status::CanonicalStatus;

/// Who is looking at a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    pub is_authenticated: bool,
    pub role: Role,
    pub tier: DisclosureTier,
}

impl ViewerContext {
    /// Unauthenticated guest on the public tier.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Register,
    RequestVerification,
    ReportSighting,
    ContactAuthorities,
    AboutPassport,
    ViewFullPassport,
    Download,
}

impl ActionKind {
    /// Whether the destination needs a logged-in user.
    pub fn requires_login(&self) -> bool {
        !matches!(self, ActionKind::AboutPassport | ActionKind::ContactAuthorities)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Primary,
    Secondary,
    Danger,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub label: String,
    pub target: String,
    pub emphasis: Emphasis,
}

fn action_target(kind: &str, registry_id: &str) -> String {
    format!(
        "/action?type={}&registryId={}",
        kind,
        urlencoding::encode(registry_id)
    )
}

fn verification_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Start registry verification",
        Role::Insurer => "Initiate insurance verification",
        _ => "Request ownership verification",
    }
}

fn download_label(role: Role) -> &'static str {
    match role {
        Role::Admin => "Export registry document",
        _ => "Download equipment passport",
    }
}

struct ActionList<'a> {
    viewer: &'a ViewerContext,
    actions: Vec<ActionDescriptor>,
}

impl<'a> ActionList<'a> {
    fn push(&mut self, kind: ActionKind, label: &str, target: String, emphasis: Emphasis) {
        let target = if kind.requires_login() && !self.viewer.is_authenticated {
            login_gate(&target)
        } else {
            target
        };
        self.actions.push(ActionDescriptor {
            kind,
            label: label.to_string(),
            target,
            emphasis,
        });
    }
}

/// Ordered actions for a machine and viewer.
///
/// `case_id` is attached to the "Contact authorities" target when present.
pub fn resolve_actions(
    registry_id: &str,
    status: CanonicalStatus,
    viewer: &ViewerContext,
    case_id: Option<&str>,
) -> Vec<ActionDescriptor> {
    let registry_id = registry_id.trim();
    let mut list = ActionList {
        viewer,
        actions: Vec::new(),
    };

    match viewer.tier {
        DisclosureTier::Public => {
            match status {
                CanonicalStatus::NotRegistered => list.push(
                    ActionKind::Register,
                    "Register this machine",
                    action_target("register", registry_id),
                    Emphasis::Primary,
                ),
                CanonicalStatus::HistoryUnknown | CanonicalStatus::RegisteredVerified => list
                    .push(
                        ActionKind::RequestVerification,
                        "Request verification",
                        action_target("verify", registry_id),
                        Emphasis::Secondary,
                    ),
                CanonicalStatus::Stolen => {}
            }
            push_stolen_actions(&mut list, status, registry_id, case_id);
            list.push(
                ActionKind::AboutPassport,
                "About this passport",
                action_target("passport", registry_id),
                Emphasis::Info,
            );
        }
        DisclosureTier::Private => {
            // Private actions are role-scoped; a guest gets only the status-driven ones
            let role = viewer.role;
            if viewer.is_authenticated && role != Role::Guest {
                list.push(
                    ActionKind::ViewFullPassport,
                    "View full passport",
                    format!("/dashboard/passport/{}", urlencoding::encode(registry_id)),
                    Emphasis::Primary,
                );
                if matches!(
                    status,
                    CanonicalStatus::HistoryUnknown | CanonicalStatus::RegisteredVerified
                ) {
                    list.push(
                        ActionKind::RequestVerification,
                        verification_label(role),
                        action_target("verify", registry_id),
                        Emphasis::Secondary,
                    );
                }
                if role == Role::Owner && status == CanonicalStatus::NotRegistered {
                    list.push(
                        ActionKind::Register,
                        "Register this machine",
                        action_target("register", registry_id),
                        Emphasis::Primary,
                    );
                }
            }
            push_stolen_actions(&mut list, status, registry_id, case_id);
            if viewer.is_authenticated && matches!(role, Role::Owner | Role::Admin) {
                list.push(
                    ActionKind::Download,
                    download_label(role),
                    action_target("download", registry_id),
                    Emphasis::Secondary,
                );
            }
        }
    }

    list.actions
}

fn push_stolen_actions(
    list: &mut ActionList<'_>,
    status: CanonicalStatus,
    registry_id: &str,
    case_id: Option<&str>,
) {
    if status != CanonicalStatus::Stolen {
        return;
    }

    list.push(
        ActionKind::ReportSighting,
        "Report a sighting",
        action_target("report", registry_id),
        Emphasis::Primary,
    );

    let mut target = format!(
        "/action/authorities?registryId={}",
        urlencoding::encode(registry_id)
    );
    if let Some(case_id) = case_id.map(str::trim).filter(|c| !c.is_empty()) {
        target.push_str("&caseId=");
        target.push_str(&urlencoding::encode(case_id));
    }
    list.push(
        ActionKind::ContactAuthorities,
        "Contact authorities",
        target,
        Emphasis::Danger,
    );
}

/// Resolve actions and log the outcome.
pub fn resolve_actions_logged(
    registry_id: &str,
    status: CanonicalStatus,
    viewer: &ViewerContext,
    case_id: Option<&str>,
    ctx: &LogContext,
) -> Vec<ActionDescriptor> {
    let actions = resolve_actions(registry_id, status, viewer, case_id);
    log::info!(
        "{} ACTIONS_RESOLVED status={} tier={} role={} authenticated={} count={}",
        ctx,
        status,
        viewer.tier.as_str(),
        viewer.role.as_str(),
        viewer.is_authenticated,
        actions.len()
    );
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(authenticated: bool, role: Role, tier: DisclosureTier) -> ViewerContext {
        ViewerContext {
            is_authenticated: authenticated,
            role,
            tier,
        }
    }

    fn labels(actions: &[ActionDescriptor]) -> Vec<&str> {
        actions.iter().map(|a| a.label.as_str()).collect()
    }

    #[test]
    fn test_public_not_registered() {
        let actions = resolve_actions(
            "ER-NOT-999",
            CanonicalStatus::NotRegistered,
            &ViewerContext::anonymous(),
            None,
        );
        assert_eq!(labels(&actions), vec!["Register this machine", "About this passport"]);
    }

    #[test]
    fn test_public_verification_for_hu_and_verified() {
        for status in [CanonicalStatus::HistoryUnknown, CanonicalStatus::RegisteredVerified] {
            let actions = resolve_actions("X", status, &ViewerContext::anonymous(), None);
            assert_eq!(labels(&actions), vec!["Request verification", "About this passport"]);
        }
    }

    #[test]
    fn test_stolen_offers_sighting_and_authorities() {
        let actions = resolve_actions(
            "ER-STOL-777",
            CanonicalStatus::Stolen,
            &ViewerContext::anonymous(),
            Some("ER-CASE-2026-00123"),
        );
        assert_eq!(
            labels(&actions),
            vec!["Report a sighting", "Contact authorities", "About this passport"]
        );
        let authorities = &actions[1];
        assert_eq!(authorities.emphasis, Emphasis::Danger);
        assert_eq!(
            authorities.target,
            "/action/authorities?registryId=ER-STOL-777&caseId=ER-CASE-2026-00123"
        );
    }

    #[test]
    fn test_authorities_without_case_id() {
        let actions = resolve_actions(
            "ER-STOL-777",
            CanonicalStatus::Stolen,
            &ViewerContext::anonymous(),
            None,
        );
        assert_eq!(actions[1].target, "/action/authorities?registryId=ER-STOL-777");
    }

    #[test]
    fn test_anonymous_targets_are_gated() {
        let actions = resolve_actions(
            "ER-STOL-777",
            CanonicalStatus::Stolen,
            &ViewerContext::anonymous(),
            None,
        );
        assert!(actions[0].target.starts_with("/login?next="));
        assert!(!actions[1].target.starts_with("/login"));
        assert!(!actions[2].target.starts_with("/login"));
    }

    #[test]
    fn test_visibility_independent_of_auth() {
        for status in CanonicalStatus::ALL {
            let anonymous = resolve_actions("X", status, &ViewerContext::anonymous(), None);
            let signed_in = resolve_actions(
                "X",
                status,
                &viewer(true, Role::Guest, DisclosureTier::Public),
                None,
            );
            assert_eq!(labels(&anonymous), labels(&signed_in));
            assert!(signed_in.iter().all(|a| !a.target.starts_with("/login")));
        }
    }

    #[test]
    fn test_private_owner_not_registered() {
        let actions = resolve_actions(
            "ER-NOT-999",
            CanonicalStatus::NotRegistered,
            &viewer(true, Role::Owner, DisclosureTier::Private),
            None,
        );
        assert_eq!(
            labels(&actions),
            vec![
                "View full passport",
                "Register this machine",
                "Download equipment passport"
            ]
        );
    }

    #[test]
    fn test_private_insurer_cannot_register_or_download() {
        let actions = resolve_actions(
            "ER-NOT-999",
            CanonicalStatus::NotRegistered,
            &viewer(true, Role::Insurer, DisclosureTier::Private),
            None,
        );
        assert_eq!(labels(&actions), vec!["View full passport"]);

        let actions = resolve_actions(
            "ER-HIS-404",
            CanonicalStatus::HistoryUnknown,
            &viewer(true, Role::Insurer, DisclosureTier::Private),
            None,
        );
        assert_eq!(
            labels(&actions),
            vec!["View full passport", "Initiate insurance verification"]
        );
    }

    #[test]
    fn test_private_admin_labels() {
        let actions = resolve_actions(
            "ER-REG-001",
            CanonicalStatus::RegisteredVerified,
            &viewer(true, Role::Admin, DisclosureTier::Private),
            None,
        );
        assert_eq!(
            labels(&actions),
            vec![
                "View full passport",
                "Start registry verification",
                "Export registry document"
            ]
        );
        assert_eq!(actions[0].target, "/dashboard/passport/ER-REG-001");
    }

    #[test]
    fn test_private_stolen_keeps_stolen_actions() {
        let actions = resolve_actions(
            "ER-STOL-777",
            CanonicalStatus::Stolen,
            &viewer(true, Role::Owner, DisclosureTier::Private),
            Some("ER-CASE-2026-00123"),
        );
        assert_eq!(
            labels(&actions),
            vec![
                "View full passport",
                "Report a sighting",
                "Contact authorities",
                "Download equipment passport"
            ]
        );
    }

    #[test]
    fn test_registry_id_is_encoded() {
        let actions = resolve_actions(
            "ER 1&2",
            CanonicalStatus::NotRegistered,
            &viewer(true, Role::Guest, DisclosureTier::Public),
            None,
        );
        assert_eq!(actions[0].target, "/action?type=register&registryId=ER%201%262");
    }
}
