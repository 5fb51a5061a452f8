//! Error handling

use thiserror::Error;

/// Errors produced by the ancestor builder, tree sequence builder, and
/// ancestor matcher.
///
/// These four kinds are distinguished so that callers can tell a
/// resource failure (`OutOfMemory`) apart from a caller bug
/// (`BadParam`, `UnknownFlag`) apart from everything else (`Generic`).
/// Internal consistency violations (an index out of sync with the edge
/// table) are programming bugs and `panic!` rather than returning one
/// of these — see the module-level discussion in `treeseq`.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TsinferError {
    /// An arena or object-heap allocation failed.
    #[error("out of memory")]
    OutOfMemory,
    /// A range or ordering precondition on the input was violated.
    #[error("bad parameter: {message}")]
    BadParam { message: String },
    /// A flags value carried bits this crate does not recognize.
    #[error("unknown flag bits: {bits:#x}")]
    UnknownFlag { bits: u32 },
    /// Any other recoverable failure.
    #[error("{message}")]
    Generic { message: String },
}

impl TsinferError {
    pub(crate) fn bad_param<S: Into<String>>(message: S) -> Self {
        TsinferError::BadParam {
            message: message.into(),
        }
    }

    pub(crate) fn generic<S: Into<String>>(message: S) -> Self {
        TsinferError::Generic {
            message: message.into(),
        }
    }
}

pub type TsinferResult<T> = Result<T, TsinferError>;
