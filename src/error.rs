//! Error types for configuration, departure parsing and per-stop queries.

use thiserror::Error;

/// Problems with the environment that stop a run before any query starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A credential variable is unset or empty
    #[error("Missing app credentials: {var} is not set")]
    MissingCredential {
        /// Name of the environment variable that was checked
        var: &'static str,
    },

    /// The API base URL could not be parsed
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A departure's date and time did not combine into a `YYYY-MM-DD HH:MM` timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not zero-padded `YYYY-MM-DD HH:MM`, e.g. `8:30` or `2024-1-1`
    #[error("Departure time {input:?} is not in YYYY-MM-DD HH:MM form")]
    Shape { input: String },

    /// Right shape but not a real date or time, e.g. `25:00`
    #[error("Cannot parse departure time {input:?}: {source}")]
    Invalid {
        input: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl ParseError {
    /// The combined string that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            Self::Shape { input } | Self::Invalid { input, .. } => input,
        }
    }
}

/// Why a single stop produced no schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The HTTP call failed or returned an unusable status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with an explicit error payload
    #[error("Remote error: {0}")]
    Remote(String),

    /// The payload was not JSON or lacked the expected structure
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A departure time could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Misuse of the aggregator by its caller.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No stop codes were given to query")]
    NoStops,
}
