use std::path::PathBuf;

use thiserror::Error;

/// Outcome of every decode operation: the recipes in document order, or one typed failure.
pub type DecodeOutcome = Result<Vec<crate::model::BeerRecipe>, DecodeError>;

/// Errors that can occur while decoding a recipe document
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes do not conform to the decoder's recipe grammar
    #[error("Malformed recipe document: {0}")]
    Format(#[from] FormatError),

    /// The input text has no UTF-8 representation
    #[error("Text cannot be encoded as UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf16Error),

    /// Retrieving the document failed or was cancelled
    #[error("Failed to retrieve recipe document: {0}")]
    Transport(#[from] TransportError),
}

/// Classification of a [`DecodeError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    Format,
    Encoding,
    Transport,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Format(_) => DecodeErrorKind::Format,
            DecodeError::Encoding(_) => DecodeErrorKind::Encoding,
            DecodeError::Transport(_) => DecodeErrorKind::Transport,
        }
    }

    /// True when the retrieval was abandoned rather than failed
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DecodeError::Transport(TransportError::Cancelled))
    }
}

/// Reasons a document was rejected by a format decoder
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected text outside the root element: {0:?}")]
    StrayText(String),

    #[error("closing tag </{0}> has no opening tag")]
    UnmatchedEnd(String),

    #[error("document is truncated: <{0}> is never closed")]
    Truncated(String),

    #[error("<{element}> is missing required field <{field}>")]
    MissingField {
        element: &'static str,
        field: &'static str,
    },

    #[error("invalid number {value:?} in <{field}>")]
    InvalidNumber { field: String, value: String },

    #[error("unsupported {quantity} unit {unit:?}")]
    UnsupportedUnit {
        quantity: &'static str,
        unit: String,
    },

    #[error("unrecognized document format")]
    UnknownFormat,
}

/// Failures reported by a [`Transport`](crate::transport::Transport)
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request could not be completed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server responded with {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A `file://` location could not be read
    #[error("could not read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("unsupported URL scheme {0:?}")]
    UnsupportedScheme(String),

    /// The retrieval was abandoned before it produced a result
    #[error("retrieval was cancelled")]
    Cancelled,

    /// The runtime driving a blocking retrieval could not be started
    #[error("could not start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Failure reported by a custom transport
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}
