use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfiguration,
    InvalidFilterAst,
    InvalidBytecode,
    RegexCompileFailure,
    IndexNotReady,
    InvalidArgument,
    Internal,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::InvalidBytecode,
            context: err.to_string(),
        }
    }
}

impl From<fst::Error> for Error {
    fn from(err: fst::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: format!("FST error: {}", err),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error {
            kind: ErrorKind::RegexCompileFailure,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;