//! Lazy query execution.
//!
//! Results are produced level by level: every chunk is scanned for 0-jump
//! matches before any 1-jump match is reported, and so on up to the
//! automaton's jump limit. A chunk is simulated the first time a level
//! reaches it; its hits for all levels are kept for the later passes, so each
//! chunk runs at most once per query.
//!
//! [`QueryCursor`] holds all of the iteration state but does not borrow the
//! automaton, which lets owners of an `Arc<JumpAutomaton>` drive it too.

use std::ops::Range;

use super::arena::NfaBuffers;
use super::chunk::{ChunkHits, EntryId};
use super::search::{best_assignment, Assignment};
use super::JumpAutomaton;
use crate::entry::Entry;
use crate::tokenizer::{lowercase, SplitName};

/// Iteration state of one query, independent of the automaton's lifetime.
#[derive(Debug)]
pub struct QueryCursor {
    pattern: Vec<u8>,
    level: u8,
    chunk: usize,
    pos: usize,
    hits: Vec<Option<ChunkHits>>,
    bufs: NfaBuffers,
}

impl QueryCursor {
    /// Start a query for `pattern`; case is ignored.
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: lowercase(pattern).into_bytes(),
            level: 0,
            chunk: 0,
            pos: 0,
            hits: Vec::new(),
            bufs: NfaBuffers::new(),
        }
    }

    /// Index and jump count of the next matching entry.
    pub fn next_hit<V>(&mut self, automaton: &JumpAutomaton<V>) -> Option<(usize, u8)> {
        if self.pattern.is_empty() {
            return None;
        }
        let chunks = automaton.chunks();
        if self.hits.len() < chunks.len() {
            self.hits.resize_with(chunks.len(), || None);
        }

        while self.level <= automaton.jumps() {
            let Some(chunk) = chunks.get(self.chunk) else {
                self.level += 1;
                self.chunk = 0;
                self.pos = 0;
                continue;
            };

            let pattern = &self.pattern;
            let bufs = &mut self.bufs;
            let hits = self.hits[self.chunk].get_or_insert_with(|| chunk.run(pattern, bufs));

            if let Some(&offset) = hits.level(self.level).get(self.pos) {
                self.pos += 1;
                let id = EntryId {
                    chunk: self.chunk as u32,
                    offset,
                };
                return Some((id.index(automaton.chunk_size()), self.level));
            }
            self.chunk += 1;
            self.pos = 0;
        }
        None
    }

    /// Next match as an entry index plus its assignment.
    ///
    /// An entry whose assignment cannot be recovered at the level the
    /// automaton reported is logged and skipped.
    pub fn next_match<V>(&mut self, automaton: &JumpAutomaton<V>) -> Option<(usize, Assignment)> {
        while let Some((index, jumps)) = self.next_hit(automaton) {
            let name = automaton.entries()[index].name();
            match best_assignment(name, &self.pattern, jumps) {
                Some(assignment) if assignment.jumps() == jumps => {
                    return Some((index, assignment));
                }
                other => {
                    tracing::error!(
                        entry = name.as_str(),
                        pattern = %String::from_utf8_lossy(&self.pattern),
                        automaton_jumps = jumps,
                        search_jumps = ?other.map(|a| a.jumps()),
                        "automaton and assignment search disagree, skipping entry"
                    );
                }
            }
        }
        None
    }
}

/// Lazy iterator over the matches of one pattern. See
/// [`JumpAutomaton::query`].
pub struct Query<'a, V> {
    automaton: &'a JumpAutomaton<V>,
    cursor: QueryCursor,
}

impl<'a, V> Query<'a, V> {
    pub(crate) fn new(automaton: &'a JumpAutomaton<V>, pattern: &str) -> Self {
        Self {
            automaton,
            cursor: QueryCursor::new(pattern),
        }
    }
}

impl<'a, V> Iterator for Query<'a, V> {
    type Item = Match<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, assignment) = self.cursor.next_match(self.automaton)?;
        Some(Match {
            index,
            entry: &self.automaton.entries()[index],
            assignment,
        })
    }
}

/// One matching entry.
#[derive(Clone, Debug)]
pub struct Match<'a, V> {
    index: usize,
    entry: &'a Entry<V>,
    assignment: Assignment,
}

impl<'a, V> Match<'a, V> {
    /// Insertion index of the entry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entry(&self) -> &'a Entry<V> {
        self.entry
    }

    pub fn name(&self) -> &'a SplitName {
        self.entry.name()
    }

    pub fn as_str(&self) -> &'a str {
        self.entry.as_str()
    }

    pub fn value(&self) -> &'a V {
        self.entry.value()
    }

    pub fn jumps(&self) -> u8 {
        self.assignment.jumps()
    }

    pub fn consumed(&self) -> &[u32] {
        self.assignment.consumed()
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Byte ranges of the identifier covered by the pattern.
    pub fn highlights(&self) -> Vec<Range<usize>> {
        self.assignment.highlights(self.entry.name()).collect()
    }
}
