//! A small restricted shell.
//!
//! The shell understands a fixed set of builtins (`cat`, `cd`, `exit`, `grep`,
//! `help`, `ls`, and optionally `mail`) and confines every path it touches to
//! a jail root chosen at startup. There are no pipes, redirections, variables
//! or external programs.
//!
//! The main entry point is [`Interpreter`], which parses command lines and runs
//! them against a [`Session`]. Path confinement lives in [`guard`]; filesystem
//! access and the working directory go through [`FileSystem`] so the shell can
//! run against the real process state or a detached working directory.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod grep;
pub mod guard;
mod interpreter;
pub mod line_reader;
pub mod parser;
pub mod session;
pub mod style;
pub mod task_sink;

pub use config::Config;
pub use error::{CommandError, GuardError};
pub use fs::{FileSystem, OsFileSystem};
pub use guard::{PathGuard, ResolvedPath};
pub use interpreter::{FAREWELL, Interpreter};
pub use session::Session;
