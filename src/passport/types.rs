//! Passport view types.
//!
//! Two disclosure layers. The private layer embeds the public layer's
//! structs verbatim (flattened on the wire), so every public field reappears
//! unchanged in a private passport.

use serde::{Deserialize, Serialize};

use crate::status::CanonicalStatus;
use crate::storage::models::AuditEvent;

/// Which layer of a passport a viewer receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureTier {
    #[default]
    Public,
    Private,
}

impl DisclosureTier {
    /// Parse a tier flag. Anything other than `private` is public.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("private") {
            DisclosureTier::Private
        } else {
            DisclosureTier::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisclosureTier::Public => "public",
            DisclosureTier::Private => "private",
        }
    }
}

/* ---------- Layer 1 (Public) ---------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMachineInfo {
    #[serde(rename = "type")]
    pub machine_type: String,
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_manufacture: Option<u16>,
    pub serial_masked: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicValidation {
    pub last_validated: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPassport {
    pub registry_id: String,
    pub status: CanonicalStatus,
    pub machine: PublicMachineInfo,
    pub validation: PublicValidation,
}

/* ---------- Layer 2 (Private) ---------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMachineInfo {
    #[serde(flatten)]
    pub public: PublicMachineInfo,
    pub serial_number: String,
    pub internal_registry_id: String,
    pub year_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateValidation {
    #[serde(flatten)]
    pub public: PublicValidation,
    pub verified_by: String,
    pub audit_trail: Vec<AuditEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivatePassport {
    pub registry_id: String,
    pub status: CanonicalStatus,
    pub machine: PrivateMachineInfo,
    pub validation: PrivateValidation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A passport at either tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Passport {
    Public(PublicPassport),
    Private(PrivatePassport),
}

impl Passport {
    pub fn registry_id(&self) -> &str {
        match self {
            Passport::Public(p) => &p.registry_id,
            Passport::Private(p) => &p.registry_id,
        }
    }

    pub fn status(&self) -> CanonicalStatus {
        match self {
            Passport::Public(p) => p.status,
            Passport::Private(p) => p.status,
        }
    }

    pub fn tier(&self) -> DisclosureTier {
        match self {
            Passport::Public(_) => DisclosureTier::Public,
            Passport::Private(_) => DisclosureTier::Private,
        }
    }

    /// The public layer of this passport.
    pub fn public_view(&self) -> PublicPassport {
        match self {
            Passport::Public(p) => p.clone(),
            Passport::Private(p) => PublicPassport {
                registry_id: p.registry_id.clone(),
                status: p.status,
                machine: p.machine.public.clone(),
                validation: p.validation.public.clone(),
            },
        }
    }
}
