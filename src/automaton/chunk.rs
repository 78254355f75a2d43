//! Fixed-size slices of an automaton's entries.
//!
//! A chunk owns one [`StateArena`] holding the NFAs of up to `chunk_size`
//! consecutive entries and one start state per entry. Accept tags carry the
//! entry's offset inside the chunk, so a chunk can be simulated on its own and
//! its hits translated back with [`EntryId`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::arena::{traverse_arena_nfa, NfaBuffers, StateArena, StateId};
use super::builder::EntryBuilder;
use crate::entry::Entry;

/// Position of an entry: `chunk * chunk_size + offset` in the entry list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub chunk: u32,
    pub offset: u32,
}

impl EntryId {
    #[inline]
    pub fn index(self, chunk_size: usize) -> usize {
        self.chunk as usize * chunk_size + self.offset as usize
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chunk {
    arena: StateArena,
    starts: Vec<StateId>,
}

impl Chunk {
    /// Build the NFAs of `entries`, allowing up to `jumps` jumps.
    pub fn build<V>(entries: &[Entry<V>], jumps: u8, builder: &mut EntryBuilder) -> Self {
        let mut arena = StateArena::new();
        let starts = entries
            .iter()
            .enumerate()
            .map(|(offset, entry)| builder.add_entry(&mut arena, entry.name(), offset as u32, jumps))
            .collect();
        arena.shrink_to_fit();
        Self { arena, starts }
    }

    /// Number of entries in the chunk.
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.arena.len()
    }

    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage() + self.starts.capacity() * std::mem::size_of::<StateId>()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.starts
            .iter()
            .all(|s| self.arena.get(*s).is_some())
            && self.arena.is_consistent(self.starts.len())
    }

    /// Simulate `pattern` (lowercased) and bucket the matching entries by the
    /// fewest jumps any of their accepting states reports.
    pub fn run(&self, pattern: &[u8], bufs: &mut NfaBuffers) -> ChunkHits {
        let mut best = vec![u8::MAX; self.starts.len()];
        traverse_arena_nfa(&self.arena, &self.starts, pattern, bufs, |accept| {
            let slot = &mut best[accept.entry as usize];
            *slot = (*slot).min(accept.jumps);
        });

        let mut hits = ChunkHits::default();
        for (offset, &jumps) in best.iter().enumerate() {
            if jumps == u8::MAX {
                continue;
            }
            let level = jumps as usize;
            if hits.levels.len() <= level {
                hits.levels.resize_with(level + 1, Vec::new);
            }
            hits.levels[level].push(offset as u32);
        }
        hits
    }
}

/// Matching entry offsets of one chunk, per jump count, in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkHits {
    levels: SmallVec<[Vec<u32>; 6]>,
}

impl ChunkHits {
    /// Offsets that match with exactly `jumps` jumps.
    pub fn level(&self, jumps: u8) -> &[u32] {
        self.levels
            .get(jumps as usize)
            .map_or(&[][..], |offsets| offsets.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }
}
