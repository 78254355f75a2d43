//! Index configuration.
//!
//! Sources, highest priority last:
//!
//! 1. Defaults
//! 2. TOML file (`typesearch.toml` or an explicit path)
//! 3. Environment variables (`TYPESEARCH_JUMPS`, `TYPESEARCH_CHUNK_SIZE`, ...)

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::automaton::{validate_parameters, DEFAULT_CHUNK_SIZE, DEFAULT_JUMPS};
use crate::error::Result;
use crate::tokenizer::Tokenizer;

/// Order in which a category's entries are fed to its automaton.
///
/// Within one jump level, matches come out in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrder {
    /// Keep the order the entries were supplied in.
    #[default]
    Input,
    /// Short simple names first, then short qualified names, then lexicographic.
    /// Also reports 0-jump matches against simple names before other matches.
    Relevance,
}

/// Build parameters shared by every category of a [`SearchIndex`](crate::SearchIndex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum number of jumps a match may use (0..=5).
    pub jumps: u8,
    /// Entries per automaton chunk. Larger chunks query faster and use more memory.
    pub chunk_size: usize,
    /// Default tokenizer for `replace`.
    pub tokenizer: Tokenizer,
    pub order: EntryOrder,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            jumps: DEFAULT_JUMPS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            tokenizer: Tokenizer::Java,
            order: EntryOrder::Input,
        }
    }
}

impl IndexConfig {
    /// Load from `typesearch.toml` in the working directory (if present) and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from_path("typesearch.toml")
    }

    /// Load from the given TOML file (missing files are ignored) and the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("TYPESEARCH_"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults. The environment is not consulted.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_parameters(self.jumps, self.chunk_size)
    }

    #[must_use]
    pub fn with_jumps(mut self, jumps: u8) -> Self {
        self.jumps = jumps;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn test_config_default_values() {
        let config = IndexConfig::default();
        assert_eq!(config.jumps, 4);
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.tokenizer, Tokenizer::Java);
        assert_eq!(config.order, EntryOrder::Input);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config = IndexConfig::from_toml(
            r#"
            jumps = 2
            chunk_size = 64
            tokenizer = "bytecode"
            order = "relevance"
            "#,
        )
        .unwrap();
        assert_eq!(config.jumps, 2);
        assert_eq!(config.chunk_size, 64);
        assert_eq!(config.tokenizer, Tokenizer::Bytecode);
        assert_eq!(config.order, EntryOrder::Relevance);
    }

    #[test]
    fn test_config_partial_toml_keeps_defaults() {
        let config = IndexConfig::from_toml("chunk_size = 8").unwrap();
        assert_eq!(config.chunk_size, 8);
        assert_eq!(config.jumps, 4);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let err = IndexConfig::from_toml("chunk_size = 0").unwrap_err();
        assert!(matches!(err, Error::Configuration { parameter: "chunk_size", .. }));

        let err = IndexConfig::from_toml("jumps = 6").unwrap_err();
        assert!(matches!(err, Error::Configuration { parameter: "jumps", .. }));

        // negative values never reach validation
        let err = IndexConfig::from_toml("jumps = -1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "jumps = 1\nchunk_size = 16").unwrap();

        let config = IndexConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.jumps, 1);
        assert_eq!(config.chunk_size, 16);
    }

    #[test]
    fn test_config_builders() {
        let config = IndexConfig::default()
            .with_jumps(0)
            .with_chunk_size(1)
            .with_order(EntryOrder::Relevance);
        assert_eq!(config.jumps, 0);
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.order, EntryOrder::Relevance);
    }
}
