//! Category index: many named automata behind one lock-free read path.
//!
//! Each category maps to an immutable [`JumpAutomaton`]. Replacing a category
//! builds the new automaton without holding any lock, then publishes it with
//! a single pointer swap:
//!
//! - Readers `load` the current category map once per [`find`](SearchIndex::find)
//!   and keep those automata alive for the whole iteration, so a concurrent
//!   replacement is never observed half-way.
//! - Writers serialize only the copy-on-write of the map itself, so builds of
//!   different categories run in parallel.
//!
//! With [`EntryOrder::Relevance`] every category also gets a 0-jump automaton
//! over the simple names (the part after the last delimiter). Matches there
//! are reported before any match against the full names, so `long` finds
//! `xxxxx.LongerName` ahead of `long.ShortName`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::BufRead;
use std::ops::Range;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use rustc_hash::FxHashSet;

use crate::automaton::{Assignment, JumpAutomaton, QueryCursor};
use crate::config::{EntryOrder, IndexConfig};
use crate::entry::{Entry, Input};
use crate::error::Result;
use crate::tokenizer::{SplitName, Tokenizer};

/// One published category.
struct Category<V> {
    automaton: Arc<JumpAutomaton<V>>,
    /// Simple names of `automaton`'s entries; values are indices into it.
    simple_names: Option<Arc<JumpAutomaton<usize>>>,
}

impl<V> Clone for Category<V> {
    fn clone(&self) -> Self {
        Self {
            automaton: Arc::clone(&self.automaton),
            simple_names: self.simple_names.clone(),
        }
    }
}

type CategoryMap<K, V> = BTreeMap<K, Category<V>>;

/// Named categories of searchable identifiers.
pub struct SearchIndex<K, V> {
    config: IndexConfig,
    categories: ArcSwap<CategoryMap<K, V>>,
    /// Serializes map updates; never held while building.
    publish_lock: Mutex<()>,
}

impl<K, V> fmt::Debug for SearchIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchIndex")
            .field("config", &self.config)
            .field("categories", &self.categories.load().len())
            .finish()
    }
}

impl<K: Ord + Clone + fmt::Debug, V> SearchIndex<K, V> {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            categories: ArcSwap::from_pointee(BTreeMap::new()),
            publish_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Build an automaton for `inputs` and make it the content of `category`.
    ///
    /// On error the previous content stays visible.
    pub fn replace(
        &self,
        category: K,
        inputs: impl IntoIterator<Item = Input<V>>,
    ) -> Result<Arc<JumpAutomaton<V>>> {
        self.replace_with_tokenizer(category, inputs, self.config.tokenizer)
    }

    /// [`replace`](Self::replace) with an explicit tokenizer.
    pub fn replace_with_tokenizer(
        &self,
        category: K,
        inputs: impl IntoIterator<Item = Input<V>>,
        tokenizer: Tokenizer,
    ) -> Result<Arc<JumpAutomaton<V>>> {
        let mut entries: Vec<Entry<V>> = inputs
            .into_iter()
            .map(|input| Entry::from_input(input, tokenizer))
            .collect();
        if self.config.order == EntryOrder::Relevance {
            entries.sort_by(|a, b| a.name().relevance_key().cmp(&b.name().relevance_key()));
        }

        let automaton = Arc::new(JumpAutomaton::build(
            entries,
            self.config.jumps,
            self.config.chunk_size,
        )?);
        let simple_names = match self.config.order {
            EntryOrder::Relevance => {
                Some(Arc::new(self.build_simple_names(&automaton, tokenizer)?))
            }
            EntryOrder::Input => None,
        };
        self.publish(
            category,
            Category {
                automaton: Arc::clone(&automaton),
                simple_names,
            },
        );
        Ok(automaton)
    }

    /// 0-jump automaton over the simple names of `automaton`, in the same order.
    fn build_simple_names(
        &self,
        automaton: &JumpAutomaton<V>,
        tokenizer: Tokenizer,
    ) -> Result<JumpAutomaton<usize>> {
        let entries = automaton.entries().iter().enumerate().map(|(index, entry)| {
            let name = entry.name();
            Entry::with_name(name.suffix(name.simple_name_component(tokenizer)), index)
        });
        JumpAutomaton::build(entries, 0, self.config.chunk_size)
    }

    fn publish(&self, category: K, content: Category<V>) {
        let _guard = self.publish_lock.lock();
        let mut map = CategoryMap::clone(&self.categories.load());
        let entries = content.automaton.len();
        map.insert(category.clone(), content);
        self.categories.store(Arc::new(map));
        tracing::info!(?category, entries, "published category");
    }

    /// Drop `category`, returning its last automaton.
    pub fn remove(&self, category: &K) -> Option<Arc<JumpAutomaton<V>>> {
        let _guard = self.publish_lock.lock();
        let mut map = CategoryMap::clone(&self.categories.load());
        let removed = map.remove(category)?;
        self.categories.store(Arc::new(map));
        tracing::info!(?category, "removed category");
        Some(removed.automaton)
    }

    /// Keys of all published categories, in key order.
    pub fn categories(&self) -> Vec<K> {
        self.categories.load().keys().cloned().collect()
    }

    pub fn get(&self, category: &K) -> Option<Arc<JumpAutomaton<V>>> {
        self.categories
            .load()
            .get(category)
            .map(|content| Arc::clone(&content.automaton))
    }

    /// Search `pattern` in the given categories.
    ///
    /// Results come fewest jumps first. Within a jump count they follow the
    /// relevance key when [`EntryOrder::Relevance`] is configured, then the
    /// category key order, then insertion order. Under `Relevance`, 0-jump
    /// matches against simple names precede everything else, and each entry
    /// is reported once. Unknown categories are ignored.
    pub fn find<'a>(&self, pattern: &str, categories: impl IntoIterator<Item = &'a K>) -> Find<K, V>
    where
        K: 'a,
    {
        let map = self.categories.load_full();
        let selected: BTreeSet<&K> = categories.into_iter().collect();
        let sources = selected
            .into_iter()
            .filter_map(|key| {
                map.get(key)
                    .map(|content| Source::new(key.clone(), content.clone(), pattern))
            })
            .collect();
        Find {
            sources,
            order: self.config.order,
        }
    }

    /// Search `pattern` in every category.
    pub fn find_all(&self, pattern: &str) -> Find<K, V> {
        let map = self.categories.load_full();
        self.find(pattern, map.keys())
    }
}

impl<K: Ord + Clone + fmt::Debug> SearchIndex<K, ()> {
    /// Replace `category` with the non-blank lines of `reader`.
    ///
    /// A read error aborts the replacement; the previous content stays.
    pub fn replace_lines(&self, category: K, reader: impl BufRead) -> Result<Arc<JumpAutomaton<()>>> {
        let mut inputs = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                inputs.push(Input::new(line, ()));
            }
        }
        self.replace(category, inputs)
    }
}

struct Head {
    index: usize,
    assignment: Assignment,
    simple_name: bool,
}

struct Source<K, V> {
    key: K,
    automaton: Arc<JumpAutomaton<V>>,
    simple_names: Option<Arc<JumpAutomaton<usize>>>,
    simple_cursor: QueryCursor,
    cursor: QueryCursor,
    /// Entries already reported from `simple_names`.
    seen: FxHashSet<usize>,
    head: Option<Head>,
    done: bool,
}

impl<K, V> Source<K, V> {
    fn new(key: K, content: Category<V>, pattern: &str) -> Self {
        Self {
            key,
            automaton: content.automaton,
            simple_names: content.simple_names,
            simple_cursor: QueryCursor::new(pattern),
            cursor: QueryCursor::new(pattern),
            seen: FxHashSet::default(),
            head: None,
            done: false,
        }
    }

    fn fill(&mut self) {
        if self.head.is_some() || self.done {
            return;
        }
        if let Some(simple_names) = &self.simple_names {
            if let Some((i, assignment)) = self.simple_cursor.next_match(simple_names) {
                let simple = &simple_names.entries()[i];
                let index = *simple.value();
                let leading = self.automaton.entries()[index].name().component_count()
                    - simple.name().component_count();
                self.seen.insert(index);
                self.head = Some(Head {
                    simple_name: true,
                    index,
                    assignment: assignment.with_leading(leading),
                });
                return;
            }
            self.simple_names = None;
        }
        while let Some((index, assignment)) = self.cursor.next_match(&self.automaton) {
            if !self.seen.contains(&index) {
                self.head = Some(Head {
                    simple_name: false,
                    index,
                    assignment,
                });
                return;
            }
        }
        self.done = true;
    }

    fn head_name(&self) -> Option<&SplitName> {
        self.head
            .as_ref()
            .map(|head| self.automaton.entries()[head.index].name())
    }
}

/// Lazy merged results of [`SearchIndex::find`].
pub struct Find<K, V> {
    /// Selected categories in key order.
    sources: Vec<Source<K, V>>,
    order: EntryOrder,
}

impl<K, V> Find<K, V> {
    fn compare(&self, a: &Source<K, V>, b: &Source<K, V>) -> Ordering {
        let tier = |s: &Source<K, V>| {
            s.head
                .as_ref()
                .map(|h| (!h.simple_name, h.assignment.jumps()))
        };
        let by_tier = tier(a).cmp(&tier(b));
        if by_tier != Ordering::Equal || self.order != EntryOrder::Relevance {
            return by_tier;
        }
        a.head_name()
            .map(SplitName::relevance_key)
            .cmp(&b.head_name().map(SplitName::relevance_key))
    }
}

impl<K: Clone, V> Iterator for Find<K, V> {
    type Item = SearchResult<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        for source in &mut self.sources {
            source.fill();
        }

        // first minimum wins, which keeps category key order on ties
        let mut best: Option<usize> = None;
        for (i, source) in self.sources.iter().enumerate() {
            if source.head.is_none() {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => self.compare(source, &self.sources[b]) == Ordering::Less,
            };
            if better {
                best = Some(i);
            }
        }

        let source = &mut self.sources[best?];
        let head = source.head.take()?;
        Some(SearchResult {
            key: source.key.clone(),
            automaton: Arc::clone(&source.automaton),
            index: head.index,
            assignment: head.assignment,
            simple_name: head.simple_name,
        })
    }
}

/// One match from a [`SearchIndex`].
#[derive(Clone, Debug)]
pub struct SearchResult<K, V> {
    key: K,
    automaton: Arc<JumpAutomaton<V>>,
    index: usize,
    assignment: Assignment,
    simple_name: bool,
}

impl<K, V> SearchResult<K, V> {
    pub fn category(&self) -> &K {
        &self.key
    }

    /// Insertion index inside the category's automaton.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entry(&self) -> &Entry<V> {
        &self.automaton.entries()[self.index]
    }

    pub fn as_str(&self) -> &str {
        self.entry().as_str()
    }

    pub fn value(&self) -> &V {
        self.entry().value()
    }

    pub fn jumps(&self) -> u8 {
        self.assignment.jumps()
    }

    /// Pattern bytes taken from each component of the full name.
    pub fn consumed(&self) -> &[u32] {
        self.assignment.consumed()
    }

    /// Whether the pattern matched the simple name without jumps.
    pub fn is_simple_name_match(&self) -> bool {
        self.simple_name
    }

    pub fn highlights(&self) -> Vec<Range<usize>> {
        self.assignment.highlights(self.entry().name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::DEFAULT_JUMPS;
    use crate::error::Error;

    fn index(order: EntryOrder) -> SearchIndex<&'static str, ()> {
        SearchIndex::new(IndexConfig::default().with_order(order)).unwrap()
    }

    fn names(find: Find<&'static str, ()>) -> Vec<(&'static str, String, u8)> {
        find.map(|r| (*r.category(), r.as_str().to_owned(), r.jumps()))
            .collect()
    }

    #[test]
    fn test_replace_and_find() {
        let index = index(EntryOrder::Input);
        index
            .replace("jdk", ["java.lang.String", "java.util.HashMap"].map(Input::from))
            .unwrap();
        assert_eq!(index.categories(), vec!["jdk"]);
        assert_eq!(
            names(index.find("hm", &["jdk"])),
            vec![("jdk", "java.util.HashMap".to_owned(), 1)]
        );
    }

    #[test]
    fn test_unknown_category_yields_nothing() {
        let index = index(EntryOrder::Input);
        assert_eq!(index.find("string", &["missing"]).count(), 0);
        assert_eq!(index.find_all("string").count(), 0);
    }

    #[test]
    fn test_empty_category() {
        let index = index(EntryOrder::Input);
        index.replace("empty", Vec::new()).unwrap();
        assert_eq!(index.find("string", &["empty"]).count(), 0);
        assert_eq!(index.get(&"empty").map(|a| a.len()), Some(0));
    }

    #[test]
    fn test_merge_orders_by_jumps_then_category() {
        let index = index(EntryOrder::Input);
        index
            .replace("b", ["java.lang.StringBuilder", "my.Str"].map(Input::from))
            .unwrap();
        index
            .replace("a", ["java.lang.String", "org.SuperTrait"].map(Input::from))
            .unwrap();
        assert_eq!(
            names(index.find("str", &["b", "a"])),
            vec![
                ("a", "java.lang.String".to_owned(), 0),
                ("b", "java.lang.StringBuilder".to_owned(), 0),
                ("b", "my.Str".to_owned(), 0),
                ("a", "org.SuperTrait".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn test_relevance_order() {
        let index = index(EntryOrder::Relevance);
        index
            .replace(
                "jdk",
                ["java.util.HashMap", "java.util.concurrent.ConcurrentHashMap", "HashMap"]
                    .map(Input::from),
            )
            .unwrap();
        index.replace("other", ["x.HashMaps"].map(Input::from)).unwrap();
        let found: Vec<_> = names(index.find_all("hashmap"))
            .into_iter()
            .map(|(_, name, _)| name)
            .collect();
        assert_eq!(
            found,
            vec![
                "HashMap",
                "java.util.HashMap",
                "x.HashMaps",
                "java.util.concurrent.ConcurrentHashMap",
            ]
        );
    }

    #[test]
    fn test_relevance_decides_across_categories() {
        for order in [EntryOrder::Input, EntryOrder::Relevance] {
            let index = index(order);
            index
                .replace("a", ["org.example.VeryLongHashMap"].map(Input::from))
                .unwrap();
            index.replace("b", ["x.HashMap"].map(Input::from)).unwrap();
            let expected = match order {
                EntryOrder::Input => vec![
                    ("a", "org.example.VeryLongHashMap".to_owned(), 1),
                    ("b", "x.HashMap".to_owned(), 1),
                ],
                EntryOrder::Relevance => vec![
                    ("b", "x.HashMap".to_owned(), 1),
                    ("a", "org.example.VeryLongHashMap".to_owned(), 1),
                ],
            };
            assert_eq!(names(index.find_all("hm")), expected);
        }
    }

    #[test]
    fn test_simple_name_matches_first() {
        let index = index(EntryOrder::Relevance);
        index
            .replace("jdk", ["xxxxx.LongerName", "long.ShortName"].map(Input::from))
            .unwrap();
        let results: Vec<_> = index
            .find("long", &["jdk"])
            .map(|r| (r.as_str().to_owned(), r.consumed().to_vec(), r.is_simple_name_match()))
            .collect();
        assert_eq!(
            results,
            vec![
                ("xxxxx.LongerName".to_owned(), vec![0, 4, 0], true),
                ("long.ShortName".to_owned(), vec![4, 0, 0], false),
            ]
        );

        let first = index.find("long", &["jdk"]).next().unwrap();
        assert_eq!(first.highlights(), vec![6..10]);
    }

    #[test]
    fn test_simple_name_complete_with_full_remaining_text() {
        let index = index(EntryOrder::Relevance);
        index
            .replace("jdk", ["myname.X", "MyName"].map(Input::from))
            .unwrap();
        assert_eq!(
            names(index.find("myname", &["jdk"])),
            vec![("jdk", "MyName".to_owned(), 0), ("jdk", "myname.X".to_owned(), 0)]
        );
    }

    #[test]
    fn test_simple_names_only_with_relevance() {
        let index = index(EntryOrder::Input);
        index
            .replace("jdk", ["xxxxx.LongerName", "long.ShortName"].map(Input::from))
            .unwrap();
        let results: Vec<_> = index
            .find("long", &["jdk"])
            .map(|r| (r.as_str().to_owned(), r.is_simple_name_match()))
            .collect();
        assert_eq!(
            results,
            vec![
                ("xxxxx.LongerName".to_owned(), false),
                ("long.ShortName".to_owned(), false),
            ]
        );
    }

    #[test]
    fn test_remove() {
        let index = index(EntryOrder::Input);
        index.replace("jdk", ["java.lang.String"].map(Input::from)).unwrap();
        assert!(index.remove(&"jdk").is_some());
        assert!(index.remove(&"jdk").is_none());
        assert!(index.categories().is_empty());
    }

    #[test]
    fn test_replace_lines() {
        let index = index(EntryOrder::Input);
        let text = "java.lang.String\n\n  java.util.HashMap  \n";
        let automaton = index.replace_lines("jdk", text.as_bytes()).unwrap();
        assert_eq!(automaton.len(), 2);
        assert_eq!(automaton.entries()[1].as_str(), "java.util.HashMap");
    }

    #[test]
    fn test_failed_replace_keeps_previous() {
        struct Broken;
        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
        }

        let index = index(EntryOrder::Input);
        index.replace("jdk", ["java.lang.String"].map(Input::from)).unwrap();
        let err = index
            .replace_lines("jdk", std::io::BufReader::new(Broken))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(index.find("string", &["jdk"]).count(), 1);
    }

    #[test]
    fn test_invalid_config() {
        let config = IndexConfig::default().with_jumps(DEFAULT_JUMPS + 10);
        assert!(SearchIndex::<String, ()>::new(config).is_err());
    }

    #[test]
    fn test_find_keeps_snapshot() {
        let index = index(EntryOrder::Input);
        index.replace("jdk", ["java.lang.String"].map(Input::from)).unwrap();
        let mut find = index.find("string", &["jdk"]);
        index.replace("jdk", Vec::new()).unwrap();
        assert_eq!(find.next().map(|r| r.as_str().to_owned()), Some("java.lang.String".to_owned()));
        assert_eq!(index.find("string", &["jdk"]).count(), 0);
    }
}
