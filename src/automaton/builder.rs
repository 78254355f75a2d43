//! Jump NFA construction for a single entry.
//!
//! States are identified by a [`StateKey`]:
//!
//! - `component`, `offset`: the next byte to consume is byte `offset` of
//!   component `component` (`component == n` once the last component is fully
//!   consumed)
//! - `remaining`: jumps still available
//! - `jumped`: the state was entered through a jump, so no byte of the
//!   current component has been consumed yet
//!
//! Edges:
//!
//! - byte edge: consume the expected byte, moving to the next offset or to the
//!   start of the next component (free)
//! - epsilon edge: move to the start of the next component. This costs one
//!   jump unless the state was itself entered by a jump, so skipping a run of
//!   components costs one jump in total. The start state counts as jumped,
//!   which makes skipping leading components free.
//!
//! Every state not entered by a jump accepts, with `jumps - remaining` jumps,
//! which makes leaving the tail of an entry unconsumed free.
//!
//! States are generated with an explicit worklist, so construction never
//! recurses regardless of identifier length.

use rustc_hash::FxHashMap;

use super::arena::{Accept, NfaState, StateArena, StateId};
use crate::tokenizer::SplitName;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    component: u32,
    offset: u32,
    remaining: u8,
    jumped: bool,
}

/// Scratch space reused across the entries of one chunk.
#[derive(Default)]
pub struct EntryBuilder {
    cache: FxHashMap<StateKey, StateId>,
    work: Vec<(StateKey, StateId)>,
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_for(&mut self, arena: &mut StateArena, key: StateKey) -> StateId {
        if let Some(&id) = self.cache.get(&key) {
            return id;
        }
        let id = arena.alloc();
        self.cache.insert(key, id);
        self.work.push((key, id));
        id
    }

    /// Add the NFA for `name` to `arena`, tagging accepting states with the
    /// chunk-relative index `entry`. Returns the entry's start state.
    pub fn add_entry(
        &mut self,
        arena: &mut StateArena,
        name: &SplitName,
        entry: u32,
        jumps: u8,
    ) -> StateId {
        self.cache.clear();
        self.work.clear();

        let n = name.component_count();
        let start = self.state_for(
            arena,
            StateKey {
                component: 0,
                offset: 0,
                remaining: jumps,
                jumped: true,
            },
        );

        while let Some((key, id)) = self.work.pop() {
            let ci = key.component as usize;
            let mut state = NfaState::default();

            if ci < n {
                let component = name.component(ci);
                let offset = key.offset as usize;
                state.byte = component[offset];
                let (component, offset) = if offset + 1 < component.len() {
                    (key.component, key.offset + 1)
                } else {
                    (key.component + 1, 0)
                };
                state.step = self.state_for(
                    arena,
                    StateKey {
                        component,
                        offset,
                        remaining: key.remaining,
                        jumped: false,
                    },
                );
            }

            if ci + 1 < n && (key.jumped || key.remaining > 0) {
                let remaining = if key.jumped {
                    key.remaining
                } else {
                    key.remaining - 1
                };
                state.epsilon = self.state_for(
                    arena,
                    StateKey {
                        component: key.component + 1,
                        offset: 0,
                        remaining,
                        jumped: true,
                    },
                );
            }

            if !key.jumped {
                state.accept = Some(Accept {
                    entry,
                    jumps: jumps - key.remaining,
                });
            }

            arena[id] = state;
        }

        start
    }
}
