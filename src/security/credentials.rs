//! Credential hashing and session roles.
//!
//! Passwords are stored as `pbkdf2-sha256$<iterations>$<salt b64>$<hash hex>`.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::actions::ViewerContext;
use crate::error::CredentialError;
use crate::passport::types::DisclosureTier;

const SCHEME: &str = "pbkdf2-sha256";
const HASH_LEN: usize = 32;
const BLOCK_SIZE: usize = 64;

/// HMAC-SHA256.
fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; HASH_LEN] {
    let mut key_block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        key_block[..HASH_LEN].copy_from_slice(&Sha256::digest(key));
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner = [0x36u8; BLOCK_SIZE];
    let mut outer = [0x5cu8; BLOCK_SIZE];
    for (i, k) in key_block.iter().enumerate() {
        inner[i] ^= k;
        outer[i] ^= k;
    }

    let mut hasher = Sha256::new();
    hasher.update(inner);
    hasher.update(data);
    let inner_hash = hasher.finalize();

    let mut hasher = Sha256::new();
    hasher.update(outer);
    hasher.update(inner_hash);

    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// PBKDF2-HMAC-SHA256 with a single output block.
pub fn pbkdf2_sha256(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
    let mut salt_with_block = salt.to_vec();
    salt_with_block.extend_from_slice(&1u32.to_be_bytes());

    let mut u = hmac_sha256(password.as_bytes(), &salt_with_block);
    let mut result = u;

    for _ in 1..iterations {
        u = hmac_sha256(password.as_bytes(), &u);
        for (r, ui) in result.iter_mut().zip(u.iter()) {
            *r ^= ui;
        }
    }

    result
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Hash a password with a fresh random 16-byte salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt = uuid::Uuid::new_v4().into_bytes();
    encode_hash(password, &salt, iterations.max(1))
}

fn encode_hash(password: &str, salt: &[u8], iterations: u32) -> String {
    let hash = pbkdf2_sha256(password, salt, iterations);
    format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        general_purpose::STANDARD.encode(salt),
        hex::encode(hash)
    )
}

/// Check `password` against a stored hash.
///
/// A wrong password is `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CredentialError> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(CredentialError::Malformed("expected 4 fields".to_string()));
    };

    if scheme != SCHEME {
        return Err(CredentialError::UnsupportedScheme(scheme.to_string()));
    }

    let iterations: u32 = iterations
        .parse()
        .map_err(|_| CredentialError::Malformed(format!("bad iteration count: {}", iterations)))?;
    if iterations == 0 {
        return Err(CredentialError::Malformed("iteration count is 0".to_string()));
    }
    let salt = general_purpose::STANDARD
        .decode(salt)
        .map_err(|e| CredentialError::Malformed(format!("bad salt: {}", e)))?;
    let expected =
        hex::decode(expected).map_err(|e| CredentialError::Malformed(format!("bad hash: {}", e)))?;

    let actual = pbkdf2_sha256(password, &salt, iterations);
    Ok(constant_time_eq(&actual, &expected))
}

/// Viewer role carried by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Owner,
    Insurer,
    Admin,
}

impl Role {
    /// Parse a stored role string. Unknown values are `Guest`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "owner" => Role::Owner,
            "insurer" | "insurance" => Role::Insurer,
            "admin" => Role::Admin,
            _ => Role::Guest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Owner => "owner",
            Role::Insurer => "insurer",
            Role::Admin => "admin",
        }
    }
}

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: u64, email: &str, role: &str) -> Self {
        Self {
            user_id,
            email: email.to_string(),
            role: Role::parse(role),
        }
    }

    /// Viewer context for this session at the requested tier.
    pub fn viewer(&self, tier: DisclosureTier) -> ViewerContext {
        ViewerContext {
            is_authenticated: true,
            role: self.role,
            tier,
        }
    }
}

/// Viewer context for an optional session. Without a session the tier is
/// always public.
pub fn viewer_for(session: Option<&Session>, requested: DisclosureTier) -> ViewerContext {
    match session {
        Some(session) => session.viewer(requested),
        None => ViewerContext::anonymous(),
    }
}
