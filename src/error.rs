use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while confining a path to the jail root.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The jail root itself cannot be canonicalized (missing or unreadable).
    #[error("jail root {} is unusable: {source}", .jail.display())]
    InvalidJail { jail: PathBuf, source: io::Error },

    /// The candidate resolves to a location outside the jail root.
    #[error("{} is outside of {}", .attempted.display(), .jail.display())]
    NotAccessible { attempted: PathBuf, jail: PathBuf },

    /// The existing part of the candidate could not be resolved.
    #[error("can't resolve {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Error kinds a builtin reports to the user.
///
/// Handlers print these locally; none of them ends the session.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid syntax! Usage: {usage}")]
    Syntax { usage: &'static str },

    #[error("{path:?} is not accessible")]
    NotAccessible { path: String },

    #[error("{path:?} doesn't exist")]
    NotFound { path: String },

    #[error("{path:?} is a directory")]
    IsADirectory { path: String },

    #[error("{path:?} is not a directory")]
    NotADirectory { path: String },

    #[error("{path:?} is not a regular file")]
    NotARegularFile { path: String },

    #[error("{0}")]
    Pattern(#[from] regex::Error),

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Map a guard failure to the message a handler prints for `path`.
    ///
    /// A broken jail root is reported the same way as an escape: either way
    /// the user may not touch the path.
    pub fn from_guard(path: &str, err: &GuardError) -> Self {
        match err {
            GuardError::Io { source, .. } => {
                CommandError::Io(io::Error::new(source.kind(), source.to_string()))
            }
            GuardError::InvalidJail { .. } | GuardError::NotAccessible { .. } => {
                CommandError::NotAccessible {
                    path: path.to_string(),
                }
            }
        }
    }
}
