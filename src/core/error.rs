// src/core/error.rs

use crate::models::AbortScope;
use crate::system::{executor::ExecutionError, operator::OperatorError};
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a unit of work.
///
/// `Aborted` is not a failure but operator-driven control flow; it is consumed
/// by the section or script runner that matches its scope.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A command exited non-zero while `continue_on_error` was off.
    #[error("command `{command}` failed with exit status {status}")]
    CommandFailure {
        /// The command line as given.
        command: String,
        /// Its exit status.
        status: i32,
    },
    /// The script's arguments failed the author's validation.
    #[error("invalid arguments: {0}")]
    ArgumentsNotValid(String),
    /// The operator interrupted the given scope.
    #[error("aborted by operator ({0} scope)")]
    Aborted(AbortScope),
    /// A directory change could not be resolved.
    #[error("cannot change directory to '{}': {source}", .path.display())]
    ChangeDirectory {
        /// The directory asked for, after expansion.
        path: PathBuf,
        /// Why it failed.
        #[source]
        source: std::io::Error,
    },
    /// A `~` or `$VAR` in a path could not be expanded.
    #[error("cannot expand path '{0}': {1}")]
    PathExpansion(String, String),
    /// Talking to the operator failed.
    #[error(transparent)]
    Operator(#[from] OperatorError),
    /// Waiting on a child process failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// Setting up the engine failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience for script bodies: validation callbacks can build this error
/// directly from any message.
impl ScriptError {
    /// Builds an [`ScriptError::ArgumentsNotValid`].
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::ArgumentsNotValid(message.into())
    }
}
