//! # Core Type Definitions
//!
//! This module contains the small value types shared by every part of the core:
//! - Normalized result values (`Value`)
//! - Enum-like query arguments (`SyllableKind`, `Datatype`)
//! - Error types (`PostdataError`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::primitives::{GRAMMATICAL_SYLLABLE_PREDICATE, METRICAL_SYLLABLE_PREDICATE};

// =============================================================================
// VALUE
// =============================================================================

/// A normalized scalar taken from a result row.
///
/// Serializes untagged, so `Int(11)` becomes `11` and `Str("abba")` becomes
/// `"abba"` in JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    /// Integer payload, if this value was coerced to an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// String payload, if this value was left as a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Str(s) => Some(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// SYLLABLE KIND
// =============================================================================

/// Which syllable count of a verse line is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyllableKind {
    /// Counted per verse-scansion rules (synalepha, diaeresis, ...).
    Metrical,
    /// Counted per orthographic/phonological rules.
    Grammatical,
}

impl SyllableKind {
    /// The POSTDATA property linking a line to syllables of this kind.
    ///
    /// This is the second positional parameter of the syllable queries.
    #[must_use]
    pub const fn predicate(self) -> &'static str {
        match self {
            Self::Metrical => METRICAL_SYLLABLE_PREDICATE,
            Self::Grammatical => GRAMMATICAL_SYLLABLE_PREDICATE,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metrical => "metrical",
            Self::Grammatical => "grammatical",
        }
    }
}

impl FromStr for SyllableKind {
    type Err = PostdataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metrical" => Ok(Self::Metrical),
            "grammatical" => Ok(Self::Grammatical),
            other => Err(PostdataError::InvalidSyllableType(other.to_string())),
        }
    }
}

impl fmt::Display for SyllableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DATATYPE
// =============================================================================

/// Target datatype when coercing a raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Datatype {
    /// Parse as a signed integer.
    Int,
    /// Keep as string.
    Str,
    /// Leave the value as it came from the store.
    #[default]
    Raw,
}

impl Datatype {
    /// Lenient flag parsing used by the stanza grouping engine.
    ///
    /// Unknown flags fall back to [`Datatype::Raw`] instead of failing.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        flag.parse().unwrap_or(Self::Raw)
    }

    /// Coerce a raw string value taken from `field`.
    pub fn coerce(self, field: &str, raw: &str) -> Result<Value, PostdataError> {
        match self {
            Self::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| PostdataError::InvalidValue {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            Self::Str | Self::Raw => Ok(Value::Str(raw.to_string())),
        }
    }
}

impl FromStr for Datatype {
    type Err = PostdataError;

    /// Strict parsing: only the integer and string flags are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" | "Integer" => Ok(Self::Int),
            "str" | "String" => Ok(Self::Str),
            other => Err(PostdataError::InvalidDatatypeFlag(other.to_string())),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the POSTDATA core.
///
/// - No silent failures
/// - The core performs no retries and no partial recovery
/// - Store errors (`ConnectionError`, `QueryError`) pass through unchanged
#[derive(Debug, Error)]
pub enum PostdataError {
    /// The operation needs a poem URI but none was set.
    #[error("No URI of the poem specified")]
    MissingUri,

    /// The operation needs a query store but none was set.
    #[error("Database connection not available")]
    NoDatabaseConnection,

    /// A field assumed to be single-valued returned several rows.
    #[error("Multiple values for {field}: {count} rows")]
    MultipleValues { field: String, count: usize },

    /// A template was bound with the wrong number of parameters.
    #[error("Query {query} expects {expected} parameter(s), got {actual}")]
    ParameterMismatch {
        query: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A parameter value cannot be placed into a query safely.
    #[error("Invalid query parameter: {0:?}")]
    InvalidParameter(String),

    /// The query store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The query store rejected the query or returned an unreadable result.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Unsupported syllable kind argument.
    #[error("Invalid syllable type: {0}")]
    InvalidSyllableType(String),

    /// Unsupported datatype flag.
    #[error("Invalid datatype flag: {0}")]
    InvalidDatatypeFlag(String),

    /// The URI does not follow the `<prefix>_<author>_<title>` layout.
    #[error("Malformed poem URI: {0}")]
    MalformedUri(String),

    /// A result row lacks a field the caller relies on.
    #[error("Missing field in result row: {0}")]
    MissingField(String),

    /// A field value could not be coerced to the requested datatype.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// A query that must yield exactly one row yielded none.
    #[error("No results for query {0}")]
    NoResults(&'static str),

    /// No poem in the corpus has this identifier.
    #[error("Poem not found: {0}")]
    PoemNotFound(String),

    /// No corpus with this name.
    #[error("Unknown corpus: {0}")]
    UnknownCorpus(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
