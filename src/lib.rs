//! typesearch: camel-hump search over qualified identifiers
//!
//! Identifiers are split into lowercase components and indexed by a chunked
//! jump automaton, so abbreviated queries find them with a bounded number of
//! "jumps" between components:
//!
//! ```
//! # use typesearch::{IndexConfig, Input, SearchIndex};
//! let index = SearchIndex::new(IndexConfig::default()).unwrap();
//! index
//!     .replace(
//!         "jdk",
//!         [
//!             Input::from("java.lang.String"),
//!             Input::from("java.util.concurrent.ConcurrentHashMap"),
//!         ],
//!     )
//!     .unwrap();
//!
//! let hit = index.find("juchama", &["jdk"]).next().unwrap();
//! assert_eq!(hit.as_str(), "java.util.concurrent.ConcurrentHashMap");
//! assert_eq!(hit.jumps(), 4);
//! ```
//!
//! A single [`JumpAutomaton`] can also be used directly; it is immutable once
//! built and safe to query from many threads.

pub mod automaton;
pub mod config;
pub mod entry;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod tokenizer;

pub use automaton::{
    Assignment, AutomatonStats, JumpAutomaton, Match, Query, DEFAULT_CHUNK_SIZE, DEFAULT_JUMPS,
    MAX_JUMPS,
};
pub use config::{EntryOrder, IndexConfig};
pub use entry::{Entry, Input};
pub use error::{Error, Result};
pub use index::{Find, SearchIndex, SearchResult};
pub use snapshot::SNAPSHOT_VERSION;
pub use tokenizer::{SplitName, Tokenizer};
