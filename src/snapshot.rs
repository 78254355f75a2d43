//! Versioned binary snapshots of built automata.
//!
//! A snapshot is the bincode encoding of a version number followed by the
//! automaton. Loading checks the version before decoding the body, then
//! re-validates the decoded parameters and chunk layout, so a restored
//! automaton answers queries exactly like the one that was saved.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::automaton::JumpAutomaton;
use crate::error::{Error, Result};

/// Snapshot version for compatibility checking
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a, V> {
    version: u32,
    automaton: &'a JumpAutomaton<V>,
}

#[derive(Deserialize)]
struct Snapshot<V> {
    version: u32,
    automaton: JumpAutomaton<V>,
}

impl<V: Serialize + DeserializeOwned> JumpAutomaton<V> {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&SnapshotRef {
            version: SNAPSHOT_VERSION,
            automaton: self,
        })?)
    }

    /// Deserialize from bytes produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version: u32 = bincode::deserialize(data)?;
        if version != SNAPSHOT_VERSION {
            return Err(Error::IncompatibleSnapshot {
                expected: SNAPSHOT_VERSION,
                actual: version,
            });
        }
        let snapshot: Snapshot<V> = bincode::deserialize(data)?;
        debug_assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        snapshot.automaton.validate()?;
        Ok(snapshot.automaton)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "saved snapshot");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let automaton = Self::from_bytes(&bytes)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            entries = automaton.len(),
            "loaded snapshot"
        );
        Ok(automaton)
    }
}
