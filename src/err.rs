use crate::binary_version::BinaryVersion;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

pub type DeserializationResult<T> = std::result::Result<T, DeserializationError>;
pub type SerializationResult<T> = std::result::Result<T, SerializationError>;

/// Errors raised while reading a binary property tree document.
///
/// Apart from [`DeserializationError::UnsupportedVersion`], every variant means the input is
/// corrupt (see [`DeserializationError::is_corrupt_data`]).
#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("binary version {found} is older than the oldest supported version {oldest}")]
    UnsupportedVersion {
        found: BinaryVersion,
        oldest: BinaryVersion,
    },

    #[error("offset {offset}: unexpected end of data while reading {what} (need {need} bytes, have {have})")]
    Truncated {
        what: &'static str,
        offset: u64,
        need: usize,
        have: usize,
    },

    #[error("offset {offset}: `{tag:#04x}` is not a valid property tree type tag")]
    UnknownTypeTag { tag: u8, offset: u64 },

    #[error("offset {offset}: string is not valid UTF-8")]
    InvalidUtf8 {
        offset: u64,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("offset {offset}: property tree is nested deeper than {max_depth} levels")]
    NestingTooDeep { offset: u64, max_depth: usize },

    #[error("offset {offset}: {remaining} unexpected bytes after the document root")]
    TrailingData { offset: u64, remaining: usize },
}

impl DeserializationError {
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, DeserializationError::UnsupportedVersion { .. })
    }

    pub fn is_corrupt_data(&self) -> bool {
        !self.is_unsupported_version()
    }

    /// Offset of the failure relative to the start of the document, if known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            DeserializationError::UnsupportedVersion { .. } => None,
            DeserializationError::Truncated { offset, .. }
            | DeserializationError::UnknownTypeTag { offset, .. }
            | DeserializationError::InvalidUtf8 { offset, .. }
            | DeserializationError::NestingTooDeep { offset, .. }
            | DeserializationError::TrailingData { offset, .. } => Some(*offset),
        }
    }
}

/// Errors raised while producing a binary property tree document.
///
/// Everything except [`SerializationError::Io`] describes a tree the format cannot express.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("string of {len} bytes does not fit a 32-bit length field")]
    StringTooLong { len: usize },

    #[error("container with {len} entries does not fit a 32-bit count field")]
    ContainerTooLarge { len: usize },

    #[error("property tree is nested deeper than {max_depth} levels")]
    NestingTooDeep { max_depth: usize },

    #[error("integer `{value}` does not fit a 32-bit signed property tree integer")]
    IntegerOutOfRange { value: String },

    #[error("`{value}` cannot be represented as a JSON number")]
    NonFiniteDouble { value: f64 },

    #[error("document is not valid JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("failed to write property tree: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SerializationError {
    pub fn is_invalid_tree(&self) -> bool {
        !matches!(self, SerializationError::Io { .. })
    }
}

/// The specific reason a settings document was rejected.
#[derive(Debug, Error)]
pub enum InvalidDocument {
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Top level error returned by [`crate::SettingsFile`].
///
/// Structural failures of any kind are folded into [`SettingsError::InvalidSettingsDocument`],
/// so callers only need to handle one condition; the precise cause stays available as the source.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("not a valid settings document")]
    InvalidSettingsDocument {
        #[source]
        source: InvalidDocument,
    },

    #[error("failed to open file {}", path.display())]
    FailedToOpenFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("failed to create file {}", path.display())]
    FailedToCreateFile {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    #[error("an I/O error has occurred")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SettingsError {
    /// The underlying cause when the document itself was rejected.
    pub fn invalid_document(&self) -> Option<&InvalidDocument> {
        match self {
            SettingsError::InvalidSettingsDocument { source } => Some(source),
            _ => None,
        }
    }
}

impl From<DeserializationError> for SettingsError {
    fn from(err: DeserializationError) -> Self {
        SettingsError::InvalidSettingsDocument {
            source: InvalidDocument::Deserialization(err),
        }
    }
}

impl From<SerializationError> for SettingsError {
    fn from(err: SerializationError) -> Self {
        match err {
            SerializationError::Io { source } => SettingsError::Io { source },
            other => SettingsError::InvalidSettingsDocument {
                source: InvalidDocument::Serialization(other),
            },
        }
    }
}
