//! Sighting report intake.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::SightingError;
use crate::logging::structured::LogContext;
use crate::security::sanitizer::{scan_text, ScanReport};

/// Reporter position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Report as submitted by a member of the public.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingReport {
    #[serde(default)]
    pub registry_id: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub coords: Option<Coords>,
}

/// Accepted report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingReceipt {
    pub case_id: String,
    pub registry_id: String,
    pub note: String,
    pub coords: Option<Coords>,
    pub received_at: DateTime<Utc>,
    pub detections: ScanReport,
}

/// New case id: `<prefix>-<year>-<6 uppercase hex>`.
///
/// Random but not collision-checked.
pub fn generate_case_id(prefix: &str, year: i32) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, year, hex[..6].to_ascii_uppercase())
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Validate and accept a sighting report.
///
/// Overlong notes are truncated, never rejected. The only rejection is a
/// blank registry id.
pub fn submit_sighting(
    report: SightingReport,
    now: DateTime<Utc>,
    config: &EngineConfig,
    ctx: &LogContext,
) -> Result<SightingReceipt, SightingError> {
    let registry_id = report.registry_id.trim();
    if registry_id.is_empty() {
        log::warn!("{} SIGHTING_REJECTED reason=missing_registry_id", ctx);
        return Err(SightingError::MissingRegistryId);
    }

    let ctx = ctx.with_registry(registry_id);
    let original_len = report.note.chars().count();
    let note = truncate_chars(&report.note, config.sighting_note_limit).to_string();
    let detections = scan_text(&note, &ctx);
    let case_id = generate_case_id(&config.case_id_prefix, now.year());

    log::info!(
        "{} SIGHTING_RECEIVED case_id={} note_len={} truncated={} coords={} detections={}",
        ctx,
        case_id,
        note.chars().count(),
        original_len > config.sighting_note_limit,
        report.coords.is_some(),
        detections.total()
    );

    Ok(SightingReceipt {
        case_id,
        registry_id: registry_id.to_string(),
        note,
        coords: report.coords,
        received_at: now,
        detections,
    })
}
