//! Machine record models.
//!
//! `RawMachineRecord` is what upstream stores hand us: free-form status text
//! and loosely formatted dates. `ingest` is the only place those are parsed;
//! everything downstream works on `MachineRecord`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::status::{normalize_status, CanonicalStatus};

/// One entry of a machine's validation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub date: String,
    pub actor: String, // insurer / dealer / registry
    pub note: String,
}

/// Machine record as supplied by a file, ORM or client-cache store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMachineRecord {
    #[serde(alias = "id")]
    pub registry_id: String,
    #[serde(default, alias = "type")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<u16>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, alias = "policyNo")]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "lastValidated", alias = "lastValidation")]
    pub last_verified_at: Option<String>,

    // Passport detail
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub internal_registry_id: Option<String>,
    #[serde(default)]
    pub year_verified: bool,
    #[serde(default)]
    pub verified_by: Option<String>,
    #[serde(default)]
    pub validation_source: Option<String>,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub audit_trail: Vec<AuditEvent>,
}

/// Machine record after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    pub registry_id: String,
    pub machine_type: Option<String>,
    pub brand: String,
    pub model: String,
    pub year: Option<u16>,
    pub country: Option<String>,
    pub owner: Option<String>,
    pub policy_number: Option<String>,
    pub status: CanonicalStatus,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub serial_number: Option<String>,
    pub internal_registry_id: Option<String>,
    pub year_verified: bool,
    pub verified_by: Option<String>,
    pub validation_source: Option<String>,
    pub case_id: Option<String>,
    pub audit_trail: Vec<AuditEvent>,
}

impl MachineRecord {
    /// Minimal record, mostly for tests and demo fixtures.
    pub fn new(
        registry_id: &str,
        brand: &str,
        model: &str,
        status: CanonicalStatus,
        last_verified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            registry_id: registry_id.to_string(),
            machine_type: None,
            brand: brand.to_string(),
            model: model.to_string(),
            year: None,
            country: None,
            owner: None,
            policy_number: None,
            status,
            last_verified_at,
            serial_number: None,
            internal_registry_id: None,
            year_verified: false,
            verified_by: None,
            validation_source: None,
            case_id: None,
            audit_trail: Vec::new(),
        }
    }

    /// Case-insensitive registry id comparison.
    pub fn matches_registry_id(&self, registry_id: &str) -> bool {
        self.registry_id
            .trim()
            .eq_ignore_ascii_case(registry_id.trim())
    }

    /// Convert back to the storage shape.
    pub fn to_raw(&self) -> RawMachineRecord {
        RawMachineRecord {
            registry_id: self.registry_id.clone(),
            machine_type: self.machine_type.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
            country: self.country.clone(),
            owner: self.owner.clone(),
            policy_number: self.policy_number.clone(),
            status: Some(self.status.as_str().to_string()),
            last_verified_at: self.last_verified_at.map(|dt| dt.to_rfc3339()),
            serial_number: self.serial_number.clone(),
            internal_registry_id: self.internal_registry_id.clone(),
            year_verified: self.year_verified,
            verified_by: self.verified_by.clone(),
            validation_source: self.validation_source.clone(),
            case_id: self.case_id.clone(),
            audit_trail: self.audit_trail.clone(),
        }
    }
}

/// Normalize a raw record. Never fails.
pub fn ingest(raw: RawMachineRecord) -> MachineRecord {
    let status = normalize_status(raw.status.as_deref());
    log::debug!(
        "STATUS_NORMALIZED registry_id={} raw={:?} status={}",
        raw.registry_id.trim(),
        raw.status,
        status
    );
    let last_verified_at = raw.last_verified_at.as_deref().and_then(parse_verified_date);

    if raw.last_verified_at.is_some() && last_verified_at.is_none() {
        log::debug!(
            "VERIFIED_DATE_UNPARSED registry_id={} value={:?}",
            raw.registry_id,
            raw.last_verified_at
        );
    }

    MachineRecord {
        registry_id: raw.registry_id.trim().to_string(),
        machine_type: raw.machine_type,
        brand: raw.brand,
        model: raw.model,
        year: raw.year,
        country: raw.country,
        owner: raw.owner,
        policy_number: raw.policy_number,
        status,
        last_verified_at,
        serial_number: raw.serial_number,
        internal_registry_id: raw.internal_registry_id,
        year_verified: raw.year_verified,
        verified_by: raw.verified_by,
        validation_source: raw.validation_source,
        case_id: raw.case_id,
        audit_trail: raw.audit_trail,
    }
}

/// Build year as a number or numeric string. Anything else is dropped
/// rather than failing the whole record set.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearField {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<YearField>::deserialize(deserializer)? {
        Some(YearField::Number(n)) => u16::try_from(n).ok(),
        Some(YearField::Text(s)) => s.trim().parse().ok(),
        Some(YearField::Other(_)) | None => None,
    })
}

/// Parse ingested records from a JSON array.
pub fn ingest_json(json: &str) -> Result<Vec<MachineRecord>, serde_json::Error> {
    let raw: Vec<RawMachineRecord> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(ingest).collect())
}

/// Parse a verification date.
///
/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
/// Partial dates such as `"2025"` or placeholders such as `"—"` yield `None`.
pub fn parse_verified_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_verified_date() {
        assert_eq!(
            parse_verified_date("2026-01-18"),
            Some(Utc.with_ymd_and_hms(2026, 1, 18, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_verified_date("2025-03-12T10:30:00+01:00"),
            Some(Utc.with_ymd_and_hms(2025, 3, 12, 9, 30, 0).unwrap())
        );
        assert_eq!(parse_verified_date("2025"), None);
        assert_eq!(parse_verified_date("—"), None);
        assert_eq!(parse_verified_date(""), None);
    }

    #[test]
    fn test_ingest_normalizes_status_once() {
        let json = r#"[
            {"id": "ER-STOL-777", "brand": "Komatsu", "model": "WA380", "country": "EU",
             "owner": "demo@equipregistry.com", "policyNo": "POL-DEMO-777",
             "status": "Stolen / Red Flag", "lastVerifiedAt": "2026-01-18"},
            {"registryId": "ER-X", "brand": "JCB", "model": "3CX", "status": "weird"}
        ]"#;

        let records = ingest_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, CanonicalStatus::Stolen);
        assert_eq!(records[0].policy_number.as_deref(), Some("POL-DEMO-777"));
        assert!(records[0].last_verified_at.is_some());
        assert_eq!(records[1].status, CanonicalStatus::NotRegistered);
        assert!(records[1].last_verified_at.is_none());
    }

    #[test]
    fn test_to_raw_round_trips_canonical_status() {
        let record = MachineRecord::new(
            "ER-REG-001",
            "Caterpillar",
            "980",
            CanonicalStatus::RegisteredVerified,
            Some(Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap()),
        );
        let raw = record.to_raw();
        assert_eq!(raw.status.as_deref(), Some("REGISTERED_VERIFIED"));
        assert_eq!(raw.last_verified_at.as_deref(), Some("2026-01-12T00:00:00+00:00"));
        assert_eq!(ingest(raw), record);
    }

    #[test]
    fn test_to_raw_keeps_time_of_day() {
        use crate::risk::evaluate;
        use chrono::Duration;

        let verified = Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap();
        let now = verified + Duration::days(180) + Duration::hours(12);
        let record = MachineRecord::new(
            "ER-REG-001",
            "Caterpillar",
            "980",
            CanonicalStatus::RegisteredVerified,
            Some(verified),
        );

        let json = serde_json::to_string(&vec![record.to_raw()]).unwrap();
        let reloaded = ingest_json(&json).unwrap();
        assert_eq!(reloaded[0].last_verified_at, Some(verified));

        // 180.5 days old: under the recheck threshold before and after the round-trip
        assert!(evaluate(&[record], now).alerts.is_empty());
        assert!(evaluate(&reloaded, now).alerts.is_empty());
    }

    #[test]
    fn test_ingest_accepts_every_upstream_shape() {
        let json = r#"[
            {"registryId": "ER-REG-001", "serial": "ER-REG-001", "brand": "Caterpillar",
             "model": "980 Wheel Loader", "year": "2021", "status": "VERIFIED",
             "lastValidation": "2025", "location": "NL / Rotterdam"},
            {"id": "ER-STOL-777", "serial": "ER-STOL-777", "brand": "Komatsu",
             "model": "WA380 Wheel Loader (2019)", "country": "EU",
             "owner": "demo@equipregistry.com", "policyNo": "POL-DEMO-777",
             "status": "STOLEN", "lastVerifiedAt": "2026-01-18"},
            {"registryId": "ER-HIS-404", "brand": "Volvo", "model": "L90H Wheel Loader",
             "year": 2014, "status": "History Unknown", "lastValidated": null},
            {"registryId": "ER-NOT-999", "brand": "JCB", "model": "3CX", "year": "n/a",
             "status": "Not Registered"}
        ]"#;

        let records = ingest_json(json).unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].year, Some(2021));
        assert_eq!(records[0].status, CanonicalStatus::RegisteredVerified);
        assert_eq!(records[0].last_verified_at, None);

        assert_eq!(records[1].registry_id, "ER-STOL-777");
        assert_eq!(records[1].year, None);
        assert_eq!(records[1].policy_number.as_deref(), Some("POL-DEMO-777"));
        assert_eq!(
            records[1].last_verified_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 18, 0, 0, 0).unwrap())
        );

        assert_eq!(records[2].year, Some(2014));
        assert_eq!(records[2].status, CanonicalStatus::HistoryUnknown);
        assert_eq!(records[2].last_verified_at, None);

        assert_eq!(records[3].year, None);
        assert_eq!(records[3].status, CanonicalStatus::NotRegistered);
    }

    #[test]
    fn test_registry_id_match_is_case_insensitive() {
        let record = MachineRecord::new("ER-REG-001", "", "", CanonicalStatus::NotRegistered, None);
        assert!(record.matches_registry_id(" er-reg-001 "));
        assert!(!record.matches_registry_id("ER-REG-002"));
    }
}
