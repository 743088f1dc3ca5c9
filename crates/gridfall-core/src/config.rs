//! Configuration validation and game file loading.
//!
//! A game is described by a [`GameConfig`]. Before any state is created the
//! configuration passes through [`validate`], which combines the structural
//! rules declared on the struct (via `validator`) with checks that need the
//! schedule evaluator: the cron expression must parse and the timezone must
//! be a known IANA name.
//!
//! For tooling and tests, a whole game (configuration plus submitted events)
//! can be loaded from a YAML [`GameFile`]:
//!
//! ```yaml
//! config:
//!   players: [ana, bo]
//!   height: 8
//!   width: 8
//!   startAt: 2026-01-01T00:00:00Z
//!   schedule: "0 12 * * *"
//!   timezone: Europe/Berlin
//! events:
//!   - type: PLACE
//!     submittedAt: 2026-01-01T09:00:00Z
//!     player: 0
//!     row: 2
//!     col: 3
//! ```

use std::path::Path;

use gridfall_types::{GameConfig, GameEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schedule;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration violates one or more rules.
    #[error("invalid player input: {}", errors.join("; "))]
    Invalid {
        /// One message per violated rule, sorted by field.
        errors: Vec<String>,
    },

    /// Failed to read a game file from disk.
    #[error("failed to read game file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse game YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Check `config` and return every violation, or `None` if it is valid.
///
/// Messages have the form `field: description` and are sorted so the
/// result is stable across runs.
pub fn validate(config: &GameConfig) -> Option<Vec<String>> {
    let mut errors = Vec::new();

    if let Err(report) = config.validate() {
        for (field, field_errors) in report.field_errors() {
            for error in field_errors {
                let detail = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                errors.push(format!("{field}: {detail}"));
            }
        }
    }

    if !config.schedule.trim().is_empty() {
        if let Err(e) = schedule::parse_expression(&config.schedule) {
            errors.push(format!("schedule: {e}"));
        }
    }
    if !config.timezone.trim().is_empty() {
        if let Err(e) = schedule::parse_timezone(&config.timezone) {
            errors.push(format!("timezone: {e}"));
        }
    }

    if errors.is_empty() {
        None
    } else {
        errors.sort();
        Some(errors)
    }
}

/// Check `config`, converting violations into [`ConfigError::Invalid`].
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] listing every violation.
pub fn ensure_valid(config: &GameConfig) -> Result<(), ConfigError> {
    match validate(config) {
        None => Ok(()),
        Some(errors) => Err(ConfigError::Invalid { errors }),
    }
}

/// A complete game description: configuration plus submitted events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFile {
    /// Game configuration.
    pub config: GameConfig,

    /// Player-submitted events, in any order.
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

impl GameFile {
    /// Load a game file from a YAML file at the given path.
    ///
    /// Only the YAML syntax is checked here; call [`validate`] (or
    /// [`init_game`](crate::init_game)) before using the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not a valid game file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a game file from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid game file.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}
