//! Signed passport export.
//!
//! Exports carry the canonical JSON payload (object keys sorted), its SHA-256
//! digest and an Ed25519 signature over the payload bytes.

use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ExportError;
use crate::logging::structured::LogContext;
use crate::passport::types::Passport;

/// A passport document ready to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedExport {
    pub key_id: String,
    pub payload: String,
    pub content_hash: String,
    pub signature: String,
}

/// SHA-256 of `content`, hex encoded.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Canonical JSON for a passport: compact, keys sorted.
pub fn canonical_json(passport: &Passport) -> Result<String, ExportError> {
    // serde_json's default map is ordered, so a round-trip through Value sorts keys
    let value = serde_json::to_value(passport)?;
    Ok(serde_json::to_string(&value)?)
}

/// Registry signing key.
pub struct ExportSigner {
    key_id: String,
    signing_key: SigningKey,
}

impl std::fmt::Debug for ExportSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl ExportSigner {
    pub fn new(key_id: &str, signing_key: SigningKey) -> Self {
        Self {
            key_id: key_id.to_string(),
            signing_key,
        }
    }

    /// Load a signer from a base64-encoded 32-byte seed.
    pub fn from_base64_seed(key_id: &str, seed_base64: &str) -> Result<Self, ExportError> {
        let seed = general_purpose::STANDARD
            .decode(seed_base64.trim())
            .map_err(|e| ExportError::InvalidKey(format!("Failed to decode base64: {}", e)))?;

        let seed: [u8; 32] = seed.try_into().map_err(|bytes: Vec<u8>| {
            ExportError::InvalidKey(format!(
                "Invalid seed length: expected 32, got {}",
                bytes.len()
            ))
        })?;

        Ok(Self::new(key_id, SigningKey::from_bytes(&seed)))
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Public half of the signing key, standard base64.
    pub fn verifying_key_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, passport: &Passport, ctx: &LogContext) -> Result<SignedExport, ExportError> {
        let payload = canonical_json(passport)?;
        let content_hash = compute_hash(&payload);
        let signature = self.signing_key.sign(payload.as_bytes());

        log::info!(
            "{} PASSPORT_EXPORTED key_id={} tier={} hash={}",
            ctx,
            self.key_id,
            passport.tier().as_str(),
            &content_hash[..16]
        );

        Ok(SignedExport {
            key_id: self.key_id.clone(),
            payload,
            content_hash,
            signature: general_purpose::URL_SAFE_NO_PAD.encode(signature.to_bytes()),
        })
    }
}

/// Check an export's hash and signature against a base64 verifying key.
pub fn verify_export(export: &SignedExport, verifying_key_base64: &str) -> Result<(), ExportError> {
    let key_bytes = general_purpose::STANDARD
        .decode(verifying_key_base64.trim())
        .map_err(|e| ExportError::InvalidKey(format!("Failed to decode base64: {}", e)))?;
    let key_array: [u8; 32] = key_bytes.try_into().map_err(|bytes: Vec<u8>| {
        ExportError::InvalidKey(format!("Invalid key length: expected 32, got {}", bytes.len()))
    })?;
    let verifying_key = VerifyingKey::from_bytes(&key_array)
        .map_err(|e| ExportError::InvalidKey(format!("Invalid public key: {}", e)))?;

    if compute_hash(&export.payload) != export.content_hash {
        return Err(ExportError::HashMismatch);
    }

    // Accept both URL-safe and standard encodings
    let signature_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(&export.signature)
        .or_else(|_| general_purpose::STANDARD.decode(&export.signature))
        .map_err(|e| ExportError::InvalidSignature(format!("Decode error: {}", e)))?;
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|e| ExportError::InvalidSignature(format!("Parse error: {}", e)))?;

    verifying_key
        .verify(export.payload.as_bytes(), &signature)
        .map_err(|e| ExportError::InvalidSignature(format!("Verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passport::disclosure::build_passport;
    use crate::passport::types::DisclosureTier;
    use crate::storage::seed::demo_records;

    const SEED: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

    fn signer() -> ExportSigner {
        ExportSigner::from_base64_seed("registry-2026", SEED).unwrap()
    }

    fn passport() -> Passport {
        let records = demo_records();
        let record = records.iter().find(|m| m.registry_id == "ER-REG-001");
        build_passport("ER-REG-001", record, DisclosureTier::Private)
    }

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash("test content");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_hash("test content"));
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let json = canonical_json(&passport()).unwrap();
        let machine = json.find("\"machine\"").unwrap();
        let registry = json.find("\"registryId\"").unwrap();
        let status = json.find("\"status\"").unwrap();
        assert!(machine < registry && registry < status);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = signer();
        let ctx = LogContext::new("test-eval");
        let export = signer.sign(&passport(), &ctx).unwrap();

        assert_eq!(export.key_id, "registry-2026");
        assert!(!export.signature.contains('='));
        assert!(verify_export(&export, &signer.verifying_key_base64()).is_ok());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = signer();
        let mut export = signer.sign(&passport(), &LogContext::new("test-eval")).unwrap();
        export.payload = export.payload.replace("Caterpillar", "Komatsu");

        assert!(matches!(
            verify_export(&export, &signer.verifying_key_base64()),
            Err(ExportError::HashMismatch)
        ));

        export.content_hash = compute_hash(&export.payload);
        assert!(matches!(
            verify_export(&export, &signer.verifying_key_base64()),
            Err(ExportError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let export = signer().sign(&passport(), &LogContext::new("test-eval")).unwrap();
        let other = ExportSigner::new("other", SigningKey::from_bytes(&[7u8; 32]));
        assert!(matches!(
            verify_export(&export, &other.verifying_key_base64()),
            Err(ExportError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_bad_seed() {
        assert!(matches!(
            ExportSigner::from_base64_seed("k", "not base64!"),
            Err(ExportError::InvalidKey(_))
        ));
        assert!(matches!(
            ExportSigner::from_base64_seed("k", "AQID"),
            Err(ExportError::InvalidKey(_))
        ));
    }
}
