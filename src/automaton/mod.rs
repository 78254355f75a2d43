//! Jump automaton: camel-hump identifier search.
//!
//! A [`JumpAutomaton`] indexes a list of identifiers and answers abbreviated
//! queries such as `juchama` for `java.util.concurrent.ConcurrentHashMap`.
//! The pattern is matched against the prefixes of the identifier's
//! components; moving on to a later component after a partial prefix, or
//! skipping components in the middle, costs a *jump*. Results come out
//! ordered by jump count, then by insertion order.
//!
//! # Module Organization
//!
//! - `sparse_set`: O(1)-clear state sets for NFA simulation
//! - `arena`: index-based NFA states and the traversal loop
//! - `builder`: per-entry jump NFA construction
//! - `chunk`: entries grouped into independently simulated arenas
//! - `search`: per-entry assignment search (highlighting and cross-checks)
//! - `query`: lazy, level-ordered result iteration

mod arena;
mod builder;
mod chunk;
mod query;
mod search;
mod sparse_set;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, Input};
use crate::error::{Error, Result};
use crate::tokenizer::Tokenizer;

pub use arena::{Accept, NfaBuffers, NfaState, StateArena, StateId};
pub use builder::EntryBuilder;
pub use chunk::{Chunk, ChunkHits, EntryId};
pub use query::{Match, Query, QueryCursor};
pub use search::{best_assignment, min_jumps, Assignment};
pub use sparse_set::SparseSet;

/// Highest supported jump limit.
pub const MAX_JUMPS: u8 = 5;
pub const DEFAULT_JUMPS: u8 = 4;
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Check the build parameters of an automaton.
pub fn validate_parameters(jumps: u8, chunk_size: usize) -> Result<()> {
    if jumps > MAX_JUMPS {
        return Err(Error::configuration(
            "jumps",
            format!("{} exceeds the maximum of {}", jumps, MAX_JUMPS),
        ));
    }
    if chunk_size == 0 || chunk_size > u32::MAX as usize {
        return Err(Error::configuration(
            "chunk_size",
            format!("{} is outside 1..={}", chunk_size, u32::MAX),
        ));
    }
    Ok(())
}

/// Size figures for an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutomatonStats {
    pub entries: usize,
    pub chunks: usize,
    pub states: usize,
    /// Approximate heap bytes of the NFA arenas.
    pub heap_bytes: usize,
}

/// An immutable, queryable set of identifiers.
///
/// Construction is the only mutating operation; afterwards the automaton can
/// be shared freely and queried from any number of threads, each query owning
/// its own traversal buffers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JumpAutomaton<V> {
    jumps: u8,
    chunk_size: usize,
    entries: Vec<Entry<V>>,
    chunks: Vec<Chunk>,
}

impl<V> JumpAutomaton<V> {
    /// Build an automaton allowing up to `jumps` jumps per match, with
    /// `chunk_size` entries per NFA chunk.
    pub fn build(
        entries: impl IntoIterator<Item = Entry<V>>,
        jumps: u8,
        chunk_size: usize,
    ) -> Result<Self> {
        validate_parameters(jumps, chunk_size)?;
        let started = Instant::now();

        let entries: Vec<Entry<V>> = entries.into_iter().collect();
        let mut builder = EntryBuilder::new();
        let chunks: Vec<Chunk> = entries
            .chunks(chunk_size)
            .map(|slice| Chunk::build(slice, jumps, &mut builder))
            .collect();

        let automaton = Self {
            jumps,
            chunk_size,
            entries,
            chunks,
        };
        tracing::debug!(
            entries = automaton.entries.len(),
            chunks = automaton.chunks.len(),
            states = automaton.state_count(),
            jumps,
            chunk_size,
            elapsed_us = started.elapsed().as_micros() as u64,
            "built jump automaton"
        );
        Ok(automaton)
    }

    /// Split `inputs` with `tokenizer` and build.
    pub fn from_inputs(
        inputs: impl IntoIterator<Item = Input<V>>,
        tokenizer: Tokenizer,
        jumps: u8,
        chunk_size: usize,
    ) -> Result<Self> {
        Self::build(
            inputs
                .into_iter()
                .map(|input| Entry::from_input(input, tokenizer)),
            jumps,
            chunk_size,
        )
    }

    /// Matches of `pattern`, fewest jumps first, then in insertion order.
    ///
    /// An empty pattern yields nothing.
    pub fn query(&self, pattern: &str) -> Query<'_, V> {
        Query::new(self, pattern)
    }

    /// Like [`query`](Self::query), but reports an empty pattern as
    /// [`Error::EmptyQuery`].
    pub fn try_query(&self, pattern: &str) -> Result<Query<'_, V>> {
        if pattern.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(self.query(pattern))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Jump limit the automaton was built with.
    #[inline]
    pub fn jumps(&self) -> u8 {
        self.jumps
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Entries in insertion order.
    #[inline]
    pub fn entries(&self) -> &[Entry<V>] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&Entry<V>> {
        self.entries.get(index)
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    fn state_count(&self) -> usize {
        self.chunks.iter().map(Chunk::state_count).sum()
    }

    pub fn stats(&self) -> AutomatonStats {
        AutomatonStats {
            entries: self.entries.len(),
            chunks: self.chunks.len(),
            states: self.state_count(),
            heap_bytes: self.chunks.iter().map(Chunk::memory_usage).sum(),
        }
    }

    /// Check parameters and chunk layout of an automaton that did not come
    /// from [`build`](Self::build).
    pub(crate) fn validate(&self) -> Result<()> {
        validate_parameters(self.jumps, self.chunk_size)?;
        let expected_chunks = self.entries.len().div_ceil(self.chunk_size);
        if self.chunks.len() != expected_chunks {
            return Err(Error::CorruptSnapshot(format!(
                "{} entries need {} chunks, found {}",
                self.entries.len(),
                expected_chunks,
                self.chunks.len()
            )));
        }
        if let Some(entry) = self.entries.iter().find(|e| !e.name().is_consistent()) {
            return Err(Error::CorruptSnapshot(format!(
                "entry {:?} has invalid component ranges",
                entry.as_str()
            )));
        }
        for (i, chunk) in self.chunks.iter().enumerate() {
            let expected_len = (self.entries.len() - i * self.chunk_size).min(self.chunk_size);
            if chunk.len() != expected_len || !chunk.is_consistent() {
                return Err(Error::CorruptSnapshot(format!(
                    "chunk {} is inconsistent with its entries",
                    i
                )));
            }
        }
        Ok(())
    }
}
