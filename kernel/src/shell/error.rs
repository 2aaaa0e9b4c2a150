/// Shell command errors.
///
/// Every variant is recoverable: the dispatcher prints it prefixed with the
/// command name and goes back to the prompt.
use alloc::string::String;

use crate::fs::ListingError;
use crate::selftest::SelfTestError;
use crate::sys::{FsError, ProcessError};

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// An argument that should have been an integer was not.
    #[error("expected {expected} but got '{token}'")]
    Parse { expected: &'static str, token: String },

    #[error("missing argument")]
    MissingArgument,

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("command not found")]
    CommandNotFound,

    #[error("test '{0}' not found")]
    TestNotFound(String),

    #[error("couldn't access root dir!")]
    NoRootDirectory,

    #[error("timeout")]
    Timeout,

    /// A child exited with a non-zero status during `stress`.
    #[error("process {pid} failed with status {exit_code}")]
    ChildFailed { pid: crate::sys::Pid, exit_code: i32 },

    /// Spawn of `path` was refused by the process table.
    #[error("{path}: {source}")]
    Spawn { path: String, source: ProcessError },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("bad directory listing: {0}")]
    Listing(#[from] ListingError),

    #[error(transparent)]
    SelfTest(#[from] SelfTestError),
}
