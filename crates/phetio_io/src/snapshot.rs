//! Versioned state snapshot files.
//!
//! A snapshot wraps a whole-session state (phetioID → state object) with a
//! format version, a save timestamp, the IOType name of every entry and a
//! SHA-256 fingerprint of the state. The fingerprint is computed over the
//! compact JSON of the state map, whose keys are sorted, so it does not
//! depend on insertion order.

use crate::error::{IoError, Result};
use crate::serialization::{read_json_file, write_json_file};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub version: u32,
    /// RFC 3339 timestamp.
    pub saved_at: String,
    pub fingerprint: String,
    /// Fingerprint of the settings the state was captured under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_fingerprint: Option<String>,
    /// IOType name of each entry in `state`.
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    pub state: BTreeMap<String, Value>,
}

/// SHA-256 hex digest of the compact JSON of `state`.
pub fn compute_fingerprint(state: &BTreeMap<String, Value>) -> Result<String> {
    let json = serde_json::to_vec(state)?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hex::encode(hasher.finalize()))
}

impl StateSnapshot {
    pub fn new(state: BTreeMap<String, Value>, types: BTreeMap<String, String>) -> Result<Self> {
        let fingerprint = compute_fingerprint(&state)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            fingerprint,
            config_fingerprint: None,
            types,
            state,
        })
    }

    #[must_use]
    pub fn with_config_fingerprint(mut self, fingerprint: String) -> Self {
        self.config_fingerprint = Some(fingerprint);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Checks the version and that the fingerprint still matches the state.
    pub fn verify(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(IoError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let computed = compute_fingerprint(&self.state)?;
        if computed != self.fingerprint {
            return Err(IoError::FingerprintMismatch {
                recorded: self.fingerprint.clone(),
                computed,
            });
        }
        if let Some(id) = self.types.keys().find(|id| !self.state.contains_key(*id)) {
            return Err(IoError::validation(format!(
                "type recorded for {id} but no state"
            )));
        }
        Ok(())
    }

    /// Writes the snapshot; `.gz` paths are compressed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, &path)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = self.state.len(),
            fingerprint = %self.fingerprint,
            "Saved state snapshot"
        );
        Ok(())
    }

    /// Reads and verifies a snapshot.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshot: Self = read_json_file(&path)?;
        snapshot
            .verify()
            .map_err(|e| e.with_context(format!("verifying {:?}", path.as_ref())))?;
        tracing::info!(
            path = %path.as_ref().display(),
            entries = snapshot.state.len(),
            saved_at = %snapshot.saved_at,
            "Loaded state snapshot"
        );
        Ok(snapshot)
    }
}
