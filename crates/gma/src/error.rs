//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// stream does not start with the gma magic
    #[error("invalid gma header: expected \"GMAD\", found {found:02X?}")]
    HeaderMismatch {
        /// The four bytes found where the magic was expected
        found: [u8; 4],
    },

    /// unsupported gma version {0}
    #[error("unsupported gma version {0}")]
    UnsupportedVersion(i8),

    /// The stream ended or failed before the archive was fully read
    #[error("gma stream is truncated")]
    TruncatedStream(#[source] std::io::Error),

    /// An entry declared a negative size
    #[error("entry {name} declares a negative size of {size}")]
    NegativeSize {
        /// Name of the offending entry
        name: String,
        /// The declared size
        size: i64,
    },

    /// A value destined for a NUL-terminated field contains a NUL byte
    #[error("{field} contains an embedded NUL byte: {value:?}")]
    InvalidString {
        /// Which field was being written
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// entry {index} has an empty name
    #[error("entry {index} has an empty name")]
    EmptyEntryName {
        /// 1-based index of the entry
        index: u32,
    },

    /// More entries than a `u32` record index can number
    #[error("{count} entries do not fit in a gma archive, at most {} are allowed", u32::MAX)]
    TooManyEntries {
        /// Number of entries in the builder
        count: usize,
    },

    /// Transparent wrapper for [`std::io::Error`] raised while writing
    #[error(transparent)]
    IOFailure(std::io::Error),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

impl Error {
    /// Classifies a [`binrw::Error`] raised while encoding.
    pub(crate) fn io_failure(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(e) => Error::IOFailure(e),
            other => Error::IOFailure(std::io::Error::other(other)),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
