//! Arena-based NFA state storage.
//!
//! Every chunk of a [`JumpAutomaton`](super::JumpAutomaton) owns one
//! `StateArena`. States reference each other through `StateId`, a plain
//! index, so the whole chunk is a single flat allocation that serializes
//! without pointer fix-ups.
//!
//! A jump NFA state has at most two outgoing edges:
//!
//! ```text
//!   (component, offset) --byte--> (next offset, or next component start)
//!   (component, offset) --eps---> (next component start, jumped)
//! ```
//!
//! so the table is a single `(byte, step)` pair plus one epsilon, instead of a
//! general byte-range table.

use serde::{Deserialize, Serialize};

use super::sparse_set::SparseSet;

/// A state identifier - an index into the owning arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct StateId(u32);

impl StateId {
    /// Sentinel for "no state".
    pub const NONE: StateId = StateId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn raw(self) -> u32 {
        self.0
    }
}

/// Accept tag: reaching this state at the end of the pattern matches the
/// chunk-relative entry `entry` using `jumps` jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accept {
    pub entry: u32,
    pub jumps: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfaState {
    /// Label of the byte edge; meaningless when `step` is `NONE`.
    pub byte: u8,
    pub step: StateId,
    pub epsilon: StateId,
    pub accept: Option<Accept>,
}

impl Default for NfaState {
    fn default() -> Self {
        Self {
            byte: 0,
            step: StateId::NONE,
            epsilon: StateId::NONE,
            accept: None,
        }
    }
}

impl NfaState {
    /// Deterministic step on `byte`.
    #[inline]
    pub fn dstep(&self, byte: u8) -> StateId {
        if self.byte == byte {
            self.step
        } else {
            StateId::NONE
        }
    }
}

/// Arena for allocating NFA states.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StateArena {
    states: Vec<NfaState>,
}

impl std::fmt::Debug for StateArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateArena")
            .field("states_count", &self.states.len())
            .finish()
    }
}

impl StateArena {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Allocate a new state with no edges, returning its ID.
    pub fn alloc(&mut self) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(NfaState::default());
        id
    }

    #[inline]
    pub fn get(&self, id: StateId) -> Option<&NfaState> {
        if id.is_none() {
            None
        } else {
            self.states.get(id.index())
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn shrink_to_fit(&mut self) {
        self.states.shrink_to_fit();
    }

    /// Approximate heap bytes used by the states.
    pub fn memory_usage(&self) -> usize {
        self.states.capacity() * std::mem::size_of::<NfaState>()
    }

    /// Whether every edge stays inside the arena and every accept tag
    /// addresses one of `entries` entries.
    pub fn is_consistent(&self, entries: usize) -> bool {
        let in_bounds = |id: StateId| id.is_none() || id.index() < self.states.len();
        self.states.iter().all(|s| {
            in_bounds(s.step)
                && in_bounds(s.epsilon)
                && s.accept.map_or(true, |a| (a.entry as usize) < entries)
        })
    }
}

impl std::ops::Index<StateId> for StateArena {
    type Output = NfaState;

    #[inline]
    fn index(&self, id: StateId) -> &Self::Output {
        &self.states[id.index()]
    }
}

impl std::ops::IndexMut<StateId> for StateArena {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut Self::Output {
        &mut self.states[id.index()]
    }
}

/// Reusable buffers for NFA traversal, shared by all chunks of one query.
#[derive(Clone, Debug, Default)]
pub struct NfaBuffers {
    current: SparseSet,
    next: SparseSet,
}

impl NfaBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for an arena of `states` states.
    fn prepare(&mut self, states: usize) {
        self.current.ensure_capacity(states);
        self.next.ensure_capacity(states);
    }

    pub fn memory_usage(&self) -> usize {
        self.current.memory_usage() + self.next.memory_usage()
    }
}

/// Add `id` and its epsilon chain to `set`.
///
/// Each state has at most one epsilon edge, so the closure is a chain and
/// stops at the first state already present.
#[inline]
fn add_closure(arena: &StateArena, set: &mut SparseSet, mut id: StateId) {
    while !id.is_none() && set.insert(id.raw()) {
        id = arena[id].epsilon;
    }
}

/// Run `pattern` through the NFA rooted at every state of `starts`, calling
/// `on_accept` for each accept tag active once the pattern is consumed.
///
/// The epsilon closure of a jump NFA's start state holds only states reached
/// by a jump, none of which accept, so an empty pattern reports nothing there.
pub fn traverse_arena_nfa(
    arena: &StateArena,
    starts: &[StateId],
    pattern: &[u8],
    bufs: &mut NfaBuffers,
    mut on_accept: impl FnMut(Accept),
) {
    if arena.is_empty() {
        return;
    }
    bufs.prepare(arena.len());

    for &start in starts {
        add_closure(arena, &mut bufs.current, start);
    }

    for &byte in pattern {
        bufs.next.clear();
        for id in bufs.current.iter() {
            let next = arena[StateId(id)].dstep(byte);
            if !next.is_none() {
                add_closure(arena, &mut bufs.next, next);
            }
        }
        std::mem::swap(&mut bufs.current, &mut bufs.next);
        if bufs.current.is_empty() {
            return;
        }
    }

    for id in bufs.current.iter() {
        if let Some(accept) = arena[StateId(id)].accept {
            on_accept(accept);
        }
    }
}
