//! Error types for decoding and validating trace dumps.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A JSON document could not be turned into trace records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),
    #[error("duplicate struct field name `{0}`")]
    DuplicateStructField(String),
    #[error("unsupported value: {0}")]
    UnsupportedValue(&'static str),
    #[error("invalid hexadecimal integer `{0}`")]
    InvalidHexInteger(String),
    #[error("{kind} field is missing key `{key}`")]
    MissingKey {
        kind: &'static str,
        key: &'static str,
    },
    #[error("{kind} field has an invalid `{key}`")]
    InvalidValue {
        kind: &'static str,
        key: &'static str,
    },
    #[error("trace document must be a JSON array")]
    NotAnArray,
    #[error("trace entry must be a JSON object, found {0}")]
    EntryNotAnObject(&'static str),
    #[error("entry {index}: {source}")]
    AtEntry {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

/// Which of the two compared dumps an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Expected => f.write_str("expected"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// Failure of a whole validation run, as opposed to a clean mismatch.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("cannot read {side} file {}: {source}", path.display())]
    Io {
        side: Side,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {side} data: {source}")]
    Json {
        side: Side,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot decode {side} data: {source}")]
    Decode {
        side: Side,
        #[source]
        source: DecodeError,
    },
}
