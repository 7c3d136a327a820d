use std::io;

/// A decoding error, due to a malformed code table or bit stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed bit-path: {0}")]
    MalformedPath(String),

    /// Two codewords violate the prefix property.
    #[error("ambiguous code: {0}")]
    AmbiguousCode(String),

    /// Decoding tried to follow a child link that was never inserted.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Only raised under [`Checks::COMPLETE_STREAM`](crate::Checks::COMPLETE_STREAM).
    #[error("truncated stream: {0}")]
    TruncatedStream(String),

    #[error("malformed bit stream: {0}")]
    MalformedStream(String),

    #[error("malformed code table: {0}")]
    Table(String),

    /// Misc. catch-all, for failures of the underlying reader.
    #[error(transparent)]
    Other(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Other(e)
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Other(e) => e,
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
