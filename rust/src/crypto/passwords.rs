//! Password hashing helpers built around bcrypt.
//! Every password passes through the same pipeline: pepper is appended, a
//! fresh salt is drawn from the operating system, and bcrypt runs at the
//! configured cost. Stored hashes keep the de-facto bcrypt encoding
//! `$<version>$<cost>$<salt><digest>` so other services reading the same
//! store stay compatible.

use std::fmt;

use bcrypt::Version;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::config::HasherConfig;
use crate::crypto::cost::CostFactor;
use crate::crypto::pepper::{apply_pepper, Pepper};

/// bcrypt reads at most this many bytes of input.
pub const MAX_INPUT_BYTES: usize = 72;
/// Empty prefix, version, cost, salt+digest.
const MIN_HASH_FIELDS: usize = 4;
const COST_FIELD: usize = 2;
const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
    #[error("bcrypt failed: {0}")]
    Primitive(String),
}

/// Returned when a stored hash does not follow the bcrypt field layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedHash {
    #[error("stored hash is not valid utf-8")]
    NotUtf8,
    #[error("stored hash has {0} fields; expected at least 4")]
    FieldCount(usize),
    #[error("cost field is not a number")]
    Cost,
}

/// A bcrypt hash ready to be persisted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedHash(String);

impl EncodedHash {
    /// Reads the cost factor embedded in a stored hash by splitting on `$`.
    pub fn parse_cost(stored: &[u8]) -> Result<u32, MalformedHash> {
        let text = std::str::from_utf8(stored).map_err(|_| MalformedHash::NotUtf8)?;
        let fields: Vec<&str> = text.split('$').collect();
        if fields.len() < MIN_HASH_FIELDS {
            return Err(MalformedHash::FieldCount(fields.len()));
        }
        fields[COST_FIELD]
            .parse::<u32>()
            .map_err(|_| MalformedHash::Cost)
    }

    pub fn cost(&self) -> Result<u32, MalformedHash> {
        Self::parse_cost(self.0.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodedHash").field(&self.0).finish()
    }
}

impl AsRef<str> for EncodedHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for EncodedHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<EncodedHash> for String {
    fn from(hash: EncodedHash) -> Self {
        hash.0
    }
}

/// Hashes `password` at `cost` with a salt drawn from the operating system.
pub fn hash_password(
    password: impl AsRef<[u8]>,
    cost: CostFactor,
    pepper: Option<&Pepper>,
) -> Result<EncodedHash, HashError> {
    hash_password_with_rng(password, cost, pepper, &mut OsRng)
}

/// Same as [`hash_password`] but draws the salt from `rng`.
/// A failing random source is reported as [`HashError::Entropy`]; no hash is
/// produced in that case.
pub fn hash_password_with_rng<R>(
    password: impl AsRef<[u8]>,
    cost: CostFactor,
    pepper: Option<&Pepper>,
    rng: &mut R,
) -> Result<EncodedHash, HashError>
where
    R: RngCore + CryptoRng,
{
    let password = password.as_ref();
    let peppered = apply_pepper(password, pepper);
    if pepper.is_some() && peppered.len() > MAX_INPUT_BYTES {
        tracing::warn!(
            input_len = peppered.len(),
            limit = MAX_INPUT_BYTES,
            "peppered password exceeds bcrypt input limit; pepper is partially ignored"
        );
    }

    let mut salt = [0u8; SALT_LEN];
    rng.try_fill_bytes(&mut salt).map_err(|e| {
        tracing::error!(error = %e, "salt generation failed");
        HashError::Entropy(format!("{e}"))
    })?;

    let parts = bcrypt::hash_with_salt(peppered.as_slice(), cost.get(), salt)
        .map_err(|e| HashError::Primitive(format!("{e}")))?;
    Ok(EncodedHash(parts.format_for_version(Version::TwoB)))
}

/// Verifies `candidate` against a stored hash. Malformed storage is reported
/// as a non-match so callers only ever see `true` or `false`.
pub fn check_password(
    candidate: impl AsRef<[u8]>,
    stored: impl AsRef<[u8]>,
    pepper: Option<&Pepper>,
) -> bool {
    let stored = match std::str::from_utf8(stored.as_ref()) {
        Ok(text) => text,
        Err(_) => {
            tracing::debug!("stored hash is not valid utf-8; reporting non-match");
            return false;
        }
    };

    let peppered = apply_pepper(candidate.as_ref(), pepper);
    match bcrypt::verify(peppered.as_slice(), stored) {
        Ok(matches) => matches,
        Err(_) => {
            tracing::debug!("stored hash is malformed; reporting non-match");
            false
        }
    }
}

/// Returns `true` when `stored` was produced at a lower cost than desired, or
/// when its cost cannot be read at all. Higher embedded costs are left alone.
/// `desired` overrides `configured` when given.
pub fn needs_rehash(
    stored: impl AsRef<[u8]>,
    desired: Option<CostFactor>,
    configured: CostFactor,
) -> bool {
    let target = desired.unwrap_or(configured);
    match EncodedHash::parse_cost(stored.as_ref()) {
        Ok(embedded) => {
            let stale = embedded < target.get();
            tracing::debug!(embedded, desired = target.get(), stale, "checked stored hash cost");
            stale
        }
        Err(e) => {
            tracing::debug!(error = %e, "unreadable stored hash; recommending rehash");
            true
        }
    }
}

/// Hashes and verifies credentials with one immutable cost and pepper.
/// Holds no mutable state and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    cost: CostFactor,
    pepper: Option<Pepper>,
}

impl CredentialHasher {
    pub fn new(cost: CostFactor, pepper: Option<Pepper>) -> Self {
        Self { cost, pepper }
    }

    pub fn from_config(config: HasherConfig) -> Self {
        let HasherConfig { cost, pepper } = config;
        Self::new(cost, pepper)
    }

    pub fn cost(&self) -> CostFactor {
        self.cost
    }

    pub fn has_pepper(&self) -> bool {
        self.pepper.is_some()
    }

    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<EncodedHash, HashError> {
        hash_password(password, self.cost, self.pepper.as_ref())
    }

    pub fn check_password(&self, candidate: impl AsRef<[u8]>, stored: impl AsRef<[u8]>) -> bool {
        check_password(candidate, stored, self.pepper.as_ref())
    }

    pub fn needs_rehash(&self, stored: impl AsRef<[u8]>, desired: Option<CostFactor>) -> bool {
        needs_rehash(stored, desired, self.cost)
    }
}
