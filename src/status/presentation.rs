//! Status presentation.
//!
//! Badge metadata and public narrative text for each canonical status.
//! The tone mapping is fixed: every surface that renders a status (search
//! result, passport, dashboards, badges) goes through `presentation_for`.

use serde::{Deserialize, Serialize};

use super::normalize::CanonicalStatus;

/// Severity tone of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Orange,
    Gray,
    Red,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Green => "green",
            Tone::Orange => "orange",
            Tone::Gray => "gray",
            Tone::Red => "red",
        }
    }
}

/// Label and tone for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    pub label: &'static str,
    pub tone: Tone,
}

/// Badge triple consumed by rendering collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub status: CanonicalStatus,
    pub label: &'static str,
    pub tone: Tone,
}

impl From<CanonicalStatus> for StatusBadge {
    fn from(status: CanonicalStatus) -> Self {
        let presentation = presentation_for(status);
        Self {
            status,
            label: presentation.label,
            tone: presentation.tone,
        }
    }
}

/// Whether narrative text is advisory or carries legal urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeSeverity {
    Advisory,
    Legal,
}

/// Public-facing narrative for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusNarrative {
    pub headline: &'static str,
    pub primary: &'static str,
    pub why: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<&'static str>,
    pub severity: NarrativeSeverity,
}

pub fn presentation_for(status: CanonicalStatus) -> StatusPresentation {
    match status {
        CanonicalStatus::RegisteredVerified => StatusPresentation {
            label: "Registered & Verified",
            tone: Tone::Green,
        },
        CanonicalStatus::HistoryUnknown => StatusPresentation {
            label: "History Unknown",
            tone: Tone::Orange,
        },
        CanonicalStatus::NotRegistered => StatusPresentation {
            label: "Not Registered",
            tone: Tone::Gray,
        },
        CanonicalStatus::Stolen => StatusPresentation {
            label: "Stolen / Red Flag",
            tone: Tone::Red,
        },
    }
}

/// Narrative text for a status.
///
/// Static per status. `Stolen` is the only legal-severity narrative and the
/// only one without a disclaimer; the urgency message stands alone.
pub fn narrative_for(status: CanonicalStatus) -> StatusNarrative {
    match status {
        CanonicalStatus::RegisteredVerified => StatusNarrative {
            headline: "Registered & Verified",
            primary: "This machine is registered in the EquipRegistry and its legal origin has been verified.",
            why: "This reduces the risk of theft or fraud and increases trust for insurers, buyers, and professional operators.",
            disclaimer: Some("This record is not proof of ownership."),
            severity: NarrativeSeverity::Advisory,
        },
        CanonicalStatus::HistoryUnknown => StatusNarrative {
            headline: "History Unknown",
            primary: "This machine is registered, but its historical origin could not be fully verified.",
            why: "Additional due diligence may be required, as some insurers or buyers apply restrictions to equipment with incomplete history.",
            disclaimer: Some("Registration does not imply confirmed ownership or origin."),
            severity: NarrativeSeverity::Advisory,
        },
        CanonicalStatus::NotRegistered => StatusNarrative {
            headline: "Not Registered",
            primary: "This serial number is not found in the EquipRegistry.",
            why: "No independent verification of legal origin or status exists for this machine.",
            disclaimer: Some("Absence from the registry is not proof of ownership or of theft."),
            severity: NarrativeSeverity::Advisory,
        },
        CanonicalStatus::Stolen => StatusNarrative {
            headline: "Reported Stolen",
            primary: "This machine has been reported stolen under an active case.",
            why: "Possession, transport, or trade of this machine may be illegal. Authorities should be contacted immediately.",
            disclaimer: None,
            severity: NarrativeSeverity::Legal,
        },
    }
}
