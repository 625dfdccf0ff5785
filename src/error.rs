use std::{error, fmt, result};

/// Type alias for Result return type, used by this package.
pub type Result<T> = result::Result<T, Error>;

/// Error variants that are returned by this package's API.
///
/// Each variant carries a prefix, typically identifying the
/// error location, and a message.
#[derive(Clone, PartialEq)]
pub enum Error {
    /// Fatal case, index invariants are broken. Only returned by
    /// validation routines.
    Fatal(String, String),
    /// Position is the end-of-sequence marker where a key is expected,
    /// belongs to another index, or refers to a removed entry.
    InvalidPosition(String, String),
    /// Node store refused to allocate a new node. Index is left
    /// untouched.
    NoMemory(String, String),
    /// Invalid input, like malformed configuration.
    InvalidInput(String, String),
    /// Numeric conversion failed.
    FailConvert(String, String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        use Error::*;

        match self {
            Fatal(p, msg) => write!(f, "{} Fatal: {}", p, msg),
            InvalidPosition(p, msg) => write!(f, "{} InvalidPosition: {}", p, msg),
            NoMemory(p, msg) => write!(f, "{} NoMemory: {}", p, msg),
            InvalidInput(p, msg) => write!(f, "{} InvalidInput: {}", p, msg),
            FailConvert(p, msg) => write!(f, "{} FailConvert: {}", p, msg),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl error::Error for Error {}
