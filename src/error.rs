use thiserror::Error;

/// Errors produced while building, querying or persisting search automata.
#[derive(Error, Debug)]
pub enum Error {
    /// A build parameter is out of range. No automaton is produced.
    #[error("invalid {parameter}: {message}")]
    Configuration {
        parameter: &'static str,
        message: String,
    },

    /// The query pattern was empty. `query` and `find` treat this as "no results";
    /// only `try_query` surfaces it.
    #[error("empty query")]
    EmptyQuery,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: incompatible version {actual}, expected {expected}")]
    IncompatibleSnapshot { expected: u32, actual: u32 },

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// A decoded snapshot does not describe a well-formed automaton.
    #[error("snapshot error: corrupt data: {0}")]
    CorruptSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for typesearch operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn configuration(parameter: &'static str, message: impl Into<String>) -> Self {
        Error::Configuration {
            parameter,
            message: message.into(),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::configuration("chunk_size", "must be at least 1");
        assert_eq!(err.to_string(), "invalid chunk_size: must be at least 1");
        assert_eq!(Error::EmptyQuery.to_string(), "empty query");
    }
}
