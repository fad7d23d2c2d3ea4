//! Demo seed data.
//!
//! The four demo machines shipped with the registry, one per status.

use crate::storage::models::{ingest, AuditEvent, MachineRecord, RawMachineRecord};

const DEMO_OWNER: &str = "demo@equipregistry.com";

/// The built-in demo machines, in dashboard order.
pub fn demo_records() -> Vec<MachineRecord> {
    vec![
        RawMachineRecord {
            registry_id: "ER-STOL-777".to_string(),
            machine_type: Some("Wheel Loader".to_string()),
            brand: "Komatsu".to_string(),
            model: "WA380".to_string(),
            year: Some(2019),
            country: Some("EU".to_string()),
            owner: Some(DEMO_OWNER.to_string()),
            policy_number: Some("POL-DEMO-777".to_string()),
            status: Some("STOLEN".to_string()),
            last_verified_at: Some("2026-01-18".to_string()),
            serial_number: Some("KMT0WA380X9012".to_string()),
            internal_registry_id: Some("INT-778777".to_string()),
            year_verified: true,
            verified_by: Some("Insurance Partner A".to_string()),
            validation_source: Some("Registry record".to_string()),
            case_id: Some("ER-CASE-2026-00123".to_string()),
            audit_trail: vec![
                audit("06/2019", "Dealer", "Initial registration"),
                audit("03/2025", "Insurer", "Reported stolen, cross-border alert"),
            ],
        },
        RawMachineRecord {
            registry_id: "ER-NOT-999".to_string(),
            machine_type: Some("Backhoe Loader".to_string()),
            brand: "JCB".to_string(),
            model: "3CX".to_string(),
            year: Some(2017),
            country: Some("EU".to_string()),
            owner: Some(DEMO_OWNER.to_string()),
            policy_number: Some("POL-DEMO-999".to_string()),
            status: Some("NOT_REGISTERED".to_string()),
            last_verified_at: Some("2025-03-22".to_string()),
            ..Default::default()
        },
        RawMachineRecord {
            registry_id: "ER-HIS-404".to_string(),
            machine_type: Some("Wheel Loader".to_string()),
            brand: "Volvo".to_string(),
            model: "L90H".to_string(),
            year: Some(2014),
            country: Some("EU".to_string()),
            owner: Some(DEMO_OWNER.to_string()),
            policy_number: Some("POL-DEMO-404".to_string()),
            status: Some("History Unknown".to_string()),
            last_verified_at: Some("2025-08-03".to_string()),
            serial_number: Some("VCE0L90HC5678".to_string()),
            internal_registry_id: Some("INT-778404".to_string()),
            year_verified: false,
            verified_by: Some("Registry partner".to_string()),
            validation_source: Some("Registry partner".to_string()),
            audit_trail: vec![audit("11/2025", "Registry", "Origin documents incomplete")],
            ..Default::default()
        },
        RawMachineRecord {
            registry_id: "ER-REG-001".to_string(),
            machine_type: Some("Wheel Loader".to_string()),
            brand: "Caterpillar".to_string(),
            model: "980".to_string(),
            year: Some(2021),
            country: Some("EU".to_string()),
            owner: Some(DEMO_OWNER.to_string()),
            policy_number: Some("POL-DEMO-001".to_string()),
            status: Some("Verified".to_string()),
            last_verified_at: Some("2026-01-12".to_string()),
            serial_number: Some("CAT0980XABC1234".to_string()),
            internal_registry_id: Some("INT-778291".to_string()),
            year_verified: true,
            verified_by: Some("Insurance Partner A".to_string()),
            validation_source: Some("Registry partner".to_string()),
            case_id: None,
            audit_trail: vec![
                audit("04/2024", "Dealer", "Initial registration"),
                audit("12/2025", "Insurer", "Ownership and serial verified"),
            ],
        },
    ]
    .into_iter()
    .map(ingest)
    .collect()
}

fn audit(date: &str, actor: &str, note: &str) -> AuditEvent {
    AuditEvent {
        date: date.to_string(),
        actor: actor.to_string(),
        note: note.to_string(),
    }
}
