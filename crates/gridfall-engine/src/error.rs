//! Error types for the replay binary.
//!
//! [`EngineError`] wraps every failure mode between reading the game file
//! and printing the replayed state.

/// Top-level error for the replay binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The game file could not be loaded or its configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gridfall_core::ConfigError,
    },

    /// The submitted events could not be appended to the process.
    #[error("process error: {source}")]
    Process {
        /// The underlying process error.
        #[from]
        source: gridfall_core::ProcessError,
    },

    /// Replay stopped on a rejected event or a bad schedule.
    #[error("replay error: {source}")]
    Replay {
        /// The underlying replay error.
        #[from]
        source: gridfall_core::ReplayError,
    },

    /// The query instant argument is not an RFC 3339 timestamp.
    #[error("invalid query instant {value:?}: {source}")]
    Query {
        /// The argument as given.
        value: String,
        /// The underlying parse error.
        source: chrono::ParseError,
    },

    /// The replayed state could not be rendered.
    #[error("output error: {source}")]
    Output {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
