use std::{fmt, io};

use csv::Error as CsvError;
use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum PubNetError {
    /// An operation combined edge or node sets whose type pairs are
    /// incompatible (compose without a shared middle type, reduce over
    /// different pairs, overlap through a type the edge set does not touch).
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Unknown feature '{feature}' on {owner}")]
    UnknownFeature { owner: String, feature: String },
    /// Reduce produced contradictory feature values for a surviving row and
    /// no resolution was supplied.
    #[error("Feature conflict: {0}")]
    FeatureConflict(String),
    /// A stored row could not be parsed and could not be healed.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
    /// A constructor invariant was violated (duplicate identifiers,
    /// misaligned column lengths, duplicate registration).
    #[error("Construction error: {0}")]
    Construction(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("File system error: {0}")]
    Io(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<io::Error> for PubNetError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => PubNetError::NotFound(format!("{x}")),
            _ => PubNetError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for PubNetError {
    fn from(x: fmt::Error) -> Self {
        PubNetError::Io(format!("{x}"))
    }
}

impl From<JsonError> for PubNetError {
    fn from(src: JsonError) -> Self {
        PubNetError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for PubNetError {
    fn from(src: toml::de::Error) -> Self {
        PubNetError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for PubNetError {
    fn from(src: toml::ser::Error) -> Self {
        PubNetError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<CsvError> for PubNetError {
    fn from(src: CsvError) -> Self {
        PubNetError::MalformedRecord(format!("Tabular read failed: {src}"))
    }
}

impl From<RegexError> for PubNetError {
    fn from(src: RegexError) -> Self {
        PubNetError::Serialization(format!("Regex parse failed: {src}"))
    }
}
