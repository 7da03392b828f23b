use std::fmt;
use std::path::PathBuf;

/// Coarse classification of an [`Error`], carried in failure notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    MissingResource,
    IllegalState,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::MissingResource => "missing resource",
            ErrorKind::IllegalState => "illegal state",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid row count '{0}': expected a positive integer")]
    InvalidRowCount(String),

    #[error("{path}:{line}: {message}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("cannot read {}: {message}", path.display())]
    MissingResource { path: PathBuf, message: String },

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("worker failed: {0}")]
    Internal(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRowCount(_) | Error::MalformedRow { .. } => ErrorKind::InvalidInput,
            Error::MissingResource { .. } => ErrorKind::MissingResource,
            Error::AlreadyRunning => ErrorKind::IllegalState,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
