//! Machine repository.
//!
//! Replaces ambient client-storage reads with an explicit source precedence:
//! a persisted override when one exists and is non-empty, otherwise seed data.

use parking_lot::RwLock;

use crate::error::RepositoryError;
use crate::status::CanonicalStatus;
use crate::storage::models::{ingest_json, MachineRecord, RawMachineRecord};

/// Read access to machine records.
pub trait MachineRepository {
    /// All records from the active source, in source order.
    fn all(&self) -> Vec<MachineRecord>;

    /// Look up a record by registry id (trimmed, case-insensitive).
    fn find(&self, registry_id: &str) -> Option<MachineRecord> {
        self.all()
            .into_iter()
            .find(|m| m.matches_registry_id(registry_id))
    }
}

impl MachineRepository for Vec<MachineRecord> {
    fn all(&self) -> Vec<MachineRecord> {
        self.clone()
    }
}

/// Which layer served the last read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Persisted,
    Seed,
}

/// Seed data with an optional persisted override.
#[derive(Debug)]
pub struct LayeredRepository {
    seed: Vec<MachineRecord>,
    persisted: RwLock<Option<Vec<MachineRecord>>>,
}

impl LayeredRepository {
    pub fn new(seed: Vec<MachineRecord>) -> Self {
        Self {
            seed,
            persisted: RwLock::new(None),
        }
    }

    /// Repository over the built-in demo machines.
    pub fn with_demo_seed() -> Self {
        Self::new(crate::storage::seed::demo_records())
    }

    /// The layer reads are currently served from.
    pub fn source(&self) -> RecordSource {
        match self.persisted.read().as_ref() {
            Some(records) if !records.is_empty() => RecordSource::Persisted,
            _ => RecordSource::Seed,
        }
    }

    /// Replace the persisted override.
    pub fn persist(&self, records: Vec<MachineRecord>) {
        log::info!("REPOSITORY_PERSISTED records={}", records.len());
        *self.persisted.write() = Some(records);
    }

    /// Load a persisted override from its JSON form.
    ///
    /// On a parse error the current layers are left untouched.
    pub fn load_persisted_json(&self, json: &str) -> Result<usize, RepositoryError> {
        let records = ingest_json(json).map_err(|e| {
            log::warn!("REPOSITORY_LOAD_FAILED error={}", e);
            RepositoryError::Parse(e)
        })?;
        let count = records.len();
        self.persist(records);
        Ok(count)
    }

    /// Serialize the active record set for persistence.
    pub fn export_json(&self) -> Result<String, RepositoryError> {
        let raw: Vec<RawMachineRecord> = self.all().iter().map(MachineRecord::to_raw).collect();
        Ok(serde_json::to_string(&raw)?)
    }

    /// Drop the override; reads fall back to seed data.
    pub fn clear_persisted(&self) {
        *self.persisted.write() = None;
        log::info!("REPOSITORY_OVERRIDE_CLEARED");
    }

    /// Change a machine's status (demo verify / flag actions).
    ///
    /// The active set is copied into the override layer; last write wins.
    pub fn set_status(
        &self,
        registry_id: &str,
        status: CanonicalStatus,
    ) -> Result<MachineRecord, RepositoryError> {
        let mut guard = self.persisted.write();
        let mut records = match guard.as_ref() {
            Some(records) if !records.is_empty() => records.clone(),
            _ => self.seed.clone(),
        };

        let record = records
            .iter_mut()
            .find(|m| m.matches_registry_id(registry_id))
            .ok_or_else(|| RepositoryError::UnknownRegistryId(registry_id.to_string()))?;

        let previous = record.status;
        record.status = status;
        let updated = record.clone();

        *guard = Some(records);

        log::info!(
            "STATUS_CHANGED registry_id={} from={} to={}",
            updated.registry_id,
            previous,
            status
        );
        Ok(updated)
    }
}

impl MachineRepository for LayeredRepository {
    fn all(&self) -> Vec<MachineRecord> {
        match self.persisted.read().as_ref() {
            Some(records) if !records.is_empty() => records.clone(),
            _ => self.seed.clone(),
        }
    }
}
