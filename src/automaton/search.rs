//! Per-entry assignment search.
//!
//! The automaton answers *which* entries match and with how many jumps. This
//! module recovers *how* an entry matches (the number of pattern bytes each
//! component contributes) for highlighting, and doubles as a reference
//! matcher for the automaton.
//!
//! The search is a bottom-up dynamic program over
//! `(pattern position, component index, entered by jump)`; every cell depends
//! only on cells with a larger pattern position or a larger component index,
//! so the table is filled by two descending loops with no recursion. Partial
//! costs above the jump budget are pruned as soon as they are produced.
//!
//! Ties between assignments of equal cost prefer placing each piece in the
//! earliest possible component, then the longest piece.

use std::ops::Range;

use smallvec::SmallVec;

use crate::tokenizer::SplitName;

const UNREACHABLE: u8 = u8::MAX;

/// How the pattern is distributed over the components of one entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    jumps: u8,
    consumed: SmallVec<[u32; 8]>,
}

impl Assignment {
    /// Jumps used by this assignment.
    #[inline]
    pub fn jumps(&self) -> u8 {
        self.jumps
    }

    /// Number of pattern bytes taken from the start of each component.
    #[inline]
    pub fn consumed(&self) -> &[u32] {
        &self.consumed
    }

    /// The same assignment behind `leading` untouched components, for a match
    /// found against a suffix of the name.
    pub fn with_leading(mut self, leading: usize) -> Self {
        self.consumed.insert_many(0, std::iter::repeat(0).take(leading));
        self
    }

    /// Byte ranges of the original identifier covered by the pattern.
    pub fn highlights<'a>(
        &'a self,
        name: &'a SplitName,
    ) -> impl Iterator<Item = Range<usize>> + 'a {
        name.ranges()
            .iter()
            .zip(self.consumed.iter())
            .filter(|&(_, &len)| len > 0)
            .map(|(range, &len)| range.start..range.start + len as usize)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Choice {
    None,
    /// Take this many bytes from the current component.
    Place(u32),
    /// Move on to the next component. From a continuation this costs a jump;
    /// after a jump it is free.
    Skip,
}

#[derive(Clone, Copy)]
struct Cell {
    cost: u8,
    choice: Choice,
}

const DEAD: Cell = Cell {
    cost: UNREACHABLE,
    choice: Choice::None,
};

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Find the cheapest assignment of `pattern` (already lowercased) to the
/// components of `name` using at most `max_jumps` jumps.
pub fn best_assignment(name: &SplitName, pattern: &[u8], max_jumps: u8) -> Option<Assignment> {
    let m = pattern.len();
    let n = name.component_count();
    if m == 0 || n == 0 {
        return None;
    }

    let width = n + 1;
    let at = |pi: usize, k: usize| pi * width + k;
    // `cont`: at the start of component k, reached by fully consuming k - 1.
    // `jump`: at the start of component k, reached by a jump already paid for.
    let mut cont = vec![DEAD; m * width];
    let mut jump = vec![DEAD; m * width];

    let add_jump = |cost: u8| {
        if cost >= max_jumps {
            UNREACHABLE
        } else {
            cost + 1
        }
    };

    for pi in (0..m).rev() {
        for k in (0..n).rev() {
            let component = name.component(k);
            let lcp = common_prefix_len(&pattern[pi..], component);

            let mut place = DEAD;
            for len in (1..=lcp).rev() {
                let next = pi + len;
                let cost = if next == m {
                    0
                } else if len == component.len() {
                    cont[at(next, k + 1)].cost
                } else {
                    add_jump(jump[at(next, k + 1)].cost)
                };
                if cost < place.cost {
                    place = Cell {
                        cost,
                        choice: Choice::Place(len as u32),
                    };
                }
            }

            let skip_free = jump[at(pi, k + 1)].cost;
            let skip_paid = if skip_free == UNREACHABLE {
                UNREACHABLE
            } else {
                add_jump(skip_free)
            };

            cont[at(pi, k)] = if place.cost <= skip_paid {
                place
            } else {
                Cell {
                    cost: skip_paid,
                    choice: Choice::Skip,
                }
            };
            jump[at(pi, k)] = if place.cost <= skip_free {
                place
            } else {
                Cell {
                    cost: skip_free,
                    choice: Choice::Skip,
                }
            };
        }
    }

    let start = jump[at(0, 0)];
    if start.cost == UNREACHABLE {
        return None;
    }

    let mut consumed: SmallVec<[u32; 8]> = SmallVec::from_elem(0, n);
    let (mut pi, mut k, mut jumped) = (0, 0, true);
    while pi < m && k < n {
        let cell = if jumped { jump[at(pi, k)] } else { cont[at(pi, k)] };
        match cell.choice {
            Choice::Place(len) => {
                consumed[k] = len;
                jumped = (len as usize) < name.component(k).len();
                pi += len as usize;
            }
            Choice::Skip => jumped = true,
            Choice::None => break,
        }
        k += 1;
    }
    debug_assert_eq!(pi, m, "assignment reconstruction stopped early");

    Some(Assignment {
        jumps: start.cost,
        consumed,
    })
}

/// Minimum jumps needed for `pattern` to match `name`, if at most `max_jumps`.
pub fn min_jumps(name: &SplitName, pattern: &[u8], max_jumps: u8) -> Option<u8> {
    best_assignment(name, pattern, max_jumps).map(|a| a.jumps)
}
