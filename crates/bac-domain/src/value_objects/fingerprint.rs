//! Request fingerprints
//!
//! A fingerprint is a SHA-256 digest over a canonical form of a request:
//! the request kind, the sorted and de-duplicated set of entity keys (each
//! rendered as JSON), and the selection parameters sorted by name. Input
//! ordering and repeated entities therefore never change the digest.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Deterministic, order-independent digest of a resolvable request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Start building a fingerprint for the given request kind
    pub fn builder(kind: impl Into<String>) -> FingerprintBuilder {
        FingerprintBuilder {
            kind: kind.into(),
            entities: BTreeSet::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Hex-encoded digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Accumulates the canonical form of a request
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    kind: String,
    entities: BTreeSet<String>,
    parameters: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct CanonicalRequest<'a> {
    kind: &'a str,
    entities: &'a BTreeSet<String>,
    parameters: &'a BTreeMap<String, String>,
}

impl FingerprintBuilder {
    /// Add one entity key
    pub fn entity<K: Serialize + ?Sized>(mut self, key: &K) -> Result<Self> {
        self.entities.insert(serde_json::to_string(key)?);
        Ok(self)
    }

    /// Add every entity key of a collection
    pub fn entities<'a, K, I>(mut self, keys: I) -> Result<Self>
    where
        K: Serialize + 'a,
        I: IntoIterator<Item = &'a K>,
    {
        for key in keys {
            self.entities.insert(serde_json::to_string(key)?);
        }
        Ok(self)
    }

    /// Add a selection parameter; a repeated name keeps the last value
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Add every parameter of a map
    pub fn parameters(mut self, parameters: &BTreeMap<String, String>) -> Self {
        self.parameters
            .extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Digest the canonical form
    pub fn build(self) -> Result<RequestFingerprint> {
        let canonical = serde_json::to_vec(&CanonicalRequest {
            kind: &self.kind,
            entities: &self.entities,
            parameters: &self.parameters,
        })?;
        let digest = Sha256::digest(&canonical);
        Ok(RequestFingerprint(hex::encode(digest)))
    }
}
