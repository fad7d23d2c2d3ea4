//! Passport disclosure engine.
//!
//! Builds the tiered passport view for a registry id. Authorization is the
//! caller's contract: this engine receives a tier flag from a session layer
//! that has already gated private access, and does not re-check it.

use crate::config::EngineConfig;
use crate::logging::structured::LogContext;
use crate::passport::types::{
    DisclosureTier, Passport, PrivateMachineInfo, PrivatePassport, PrivateValidation,
    PublicMachineInfo, PublicPassport, PublicValidation,
};
use crate::status::CanonicalStatus;
use crate::storage::models::MachineRecord;

/// Marker for fields with no data.
pub const PLACEHOLDER: &str = "-";

const MASK: &str = "***";
const SOURCE_NOT_AVAILABLE: &str = "N/A";
const PRIVATE_NOTES: &str =
    "This private passport view contains confidential verification data intended for authorized parties only.";

/// Mask a serial number, keeping at most `visible` trailing characters.
///
/// Serials no longer than `visible` are masked entirely.
pub fn mask_serial(serial: &str, visible: usize) -> String {
    let chars: Vec<char> = serial.trim().chars().collect();
    if chars.len() <= visible {
        return MASK.to_string();
    }
    let suffix: String = chars[chars.len() - visible..].iter().collect();
    format!("{}{}", MASK, suffix)
}

/// Provenance label fixed per status unless the record names its own.
fn default_source(status: CanonicalStatus) -> &'static str {
    match status {
        CanonicalStatus::Stolen => "Registry record",
        _ => "Registry partner",
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Tiered passport builder.
#[derive(Debug, Clone)]
pub struct DisclosureEngine {
    serial_visible_suffix: usize,
}

impl Default for DisclosureEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DisclosureEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            serial_visible_suffix: config.serial_visible_suffix,
        }
    }

    /// Build the passport for `registry_id` at `tier`.
    ///
    /// A missing record yields a renderable `NotRegistered` passport with
    /// placeholder fields rather than an error.
    pub fn build(
        &self,
        registry_id: &str,
        record: Option<&MachineRecord>,
        tier: DisclosureTier,
        ctx: &LogContext,
    ) -> Passport {
        let public = match record {
            Some(m) => self.public_layer(m),
            None => not_found_public(registry_id),
        };

        let passport = match tier {
            DisclosureTier::Public => Passport::Public(public),
            DisclosureTier::Private => Passport::Private(match record {
                Some(m) => self.private_layer(public, m),
                None => not_found_private(public),
            }),
        };

        log::info!(
            "{} PASSPORT_BUILT tier={} status={} found={}",
            ctx,
            tier.as_str(),
            passport.status(),
            record.is_some()
        );

        passport
    }

    fn public_layer(&self, m: &MachineRecord) -> PublicPassport {
        let serial = m.serial_number.as_deref().unwrap_or(&m.registry_id);

        PublicPassport {
            registry_id: m.registry_id.clone(),
            status: m.status,
            machine: PublicMachineInfo {
                machine_type: or_placeholder(m.machine_type.as_deref()),
                brand: or_placeholder(Some(&m.brand)),
                model: or_placeholder(Some(&m.model)),
                year_of_manufacture: m.year,
                serial_masked: mask_serial(serial, self.serial_visible_suffix),
            },
            validation: PublicValidation {
                last_validated: m
                    .last_verified_at
                    .map(|dt| dt.format("%m/%Y").to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                source: m
                    .validation_source
                    .clone()
                    .unwrap_or_else(|| default_source(m.status).to_string()),
            },
        }
    }

    fn private_layer(&self, public: PublicPassport, m: &MachineRecord) -> PrivatePassport {
        let serial = m.serial_number.as_deref().unwrap_or(&m.registry_id);

        PrivatePassport {
            registry_id: public.registry_id,
            status: public.status,
            machine: PrivateMachineInfo {
                public: public.machine,
                serial_number: serial.to_string(),
                internal_registry_id: or_placeholder(m.internal_registry_id.as_deref()),
                year_verified: m.year_verified,
            },
            validation: PrivateValidation {
                public: public.validation,
                verified_by: or_placeholder(m.verified_by.as_deref()),
                audit_trail: m.audit_trail.clone(),
            },
            notes: Some(PRIVATE_NOTES.to_string()),
        }
    }
}

fn not_found_public(registry_id: &str) -> PublicPassport {
    PublicPassport {
        registry_id: registry_id.trim().to_string(),
        status: CanonicalStatus::NotRegistered,
        machine: PublicMachineInfo {
            machine_type: PLACEHOLDER.to_string(),
            brand: PLACEHOLDER.to_string(),
            model: PLACEHOLDER.to_string(),
            year_of_manufacture: None,
            serial_masked: MASK.to_string(),
        },
        validation: PublicValidation {
            last_validated: PLACEHOLDER.to_string(),
            source: SOURCE_NOT_AVAILABLE.to_string(),
        },
    }
}

fn not_found_private(public: PublicPassport) -> PrivatePassport {
    PrivatePassport {
        registry_id: public.registry_id,
        status: public.status,
        machine: PrivateMachineInfo {
            public: public.machine,
            serial_number: PLACEHOLDER.to_string(),
            internal_registry_id: PLACEHOLDER.to_string(),
            year_verified: false,
        },
        validation: PrivateValidation {
            public: public.validation,
            verified_by: PLACEHOLDER.to_string(),
            audit_trail: Vec::new(),
        },
        notes: None,
    }
}

/// Build a passport with the default configuration.
pub fn build_passport(
    registry_id: &str,
    record: Option<&MachineRecord>,
    tier: DisclosureTier,
) -> Passport {
    DisclosureEngine::default().build(registry_id, record, tier, &LogContext::new("passport"))
}
