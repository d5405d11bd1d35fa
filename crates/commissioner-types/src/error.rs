use std::fmt;

/// The error taxonomy shared by every commissioner-* crate (spec §7).
///
/// `ErrorKind::None` is not constructed by this enum on purpose - success is
/// represented by `Ok`, not by a sentinel error value. It exists only so
/// callers that mirror the original source's status-code style (e.g. when
/// logging a job's terminal state) have a symbol for "no error" without
/// reaching for `Option<ErrorKind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    None,
    InvalidArgs,
    InvalidCommand,
    InvalidState,
    NotFound,
    Ambiguity,
    Restricted,
    BadFormat,
    IoError,
    RegistryError,
    Security,
    Cancelled,
    Timeout,
    OutOfMemory,
    Rejected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::None => "none",
            ErrorKind::InvalidArgs => "invalid args",
            ErrorKind::InvalidCommand => "invalid command",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::NotFound => "not found",
            ErrorKind::Ambiguity => "ambiguity",
            ErrorKind::Restricted => "restricted",
            ErrorKind::BadFormat => "bad format",
            ErrorKind::IoError => "io error",
            ErrorKind::RegistryError => "registry error",
            ErrorKind::Security => "security",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::OutOfMemory => "out of memory",
            ErrorKind::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A core error: a kind plus a human-readable message.
///
/// This is the one error type that crosses crate boundaries in this
/// workspace; every crate-local error converts into it via `From`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgs, message)
    }

    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCommand, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn ambiguity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Ambiguity, message)
    }

    pub fn restricted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Restricted, message)
    }

    pub fn bad_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadFormat, message)
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, message)
    }

    pub fn registry_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RegistryError, message)
    }

    pub fn security(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Security, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rejected, message)
    }

    pub fn is_restricted(&self) -> bool {
        self.kind == ErrorKind::Restricted
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::bad_format(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
