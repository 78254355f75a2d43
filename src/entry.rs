use serde::{Deserialize, Serialize};

use crate::tokenizer::{SplitName, Tokenizer};

/// A raw identifier and its payload, as supplied to
/// [`SearchIndex::replace`](crate::SearchIndex::replace).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input<V> {
    pub string: String,
    pub value: V,
}

impl<V> Input<V> {
    pub fn new(string: impl Into<String>, value: V) -> Self {
        Self {
            string: string.into(),
            value,
        }
    }
}

impl From<&str> for Input<()> {
    fn from(string: &str) -> Self {
        Input::new(string, ())
    }
}

/// One indexed identifier. Immutable once it is part of an automaton.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<V> {
    name: SplitName,
    value: V,
}

impl<V> Entry<V> {
    pub fn new(string: impl Into<String>, value: V, tokenizer: Tokenizer) -> Self {
        Self {
            name: SplitName::new(string, tokenizer),
            value,
        }
    }

    /// An entry over an already split name.
    pub fn with_name(name: SplitName, value: V) -> Self {
        Self { name, value }
    }

    pub fn from_input(input: Input<V>, tokenizer: Tokenizer) -> Self {
        Self::new(input.string, input.value, tokenizer)
    }

    #[inline]
    pub fn name(&self) -> &SplitName {
        &self.name
    }

    /// The original identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }
}
