use crate::task_sink::FileTaskSink;
use argh::FromArgs;
use std::path::PathBuf;

/// Environment variable holding the log filter, e.g. `EASY_SHELL_LOG=debug`.
pub const LOG_ENV: &str = "EASY_SHELL_LOG";

#[derive(FromArgs, Debug)]
/// A restricted shell: cat, cd, grep, help, ls and exit, confined to one directory tree.
pub struct Args {
    #[argh(positional)]
    /// directory to start in; it becomes the jail root. Defaults to the current directory.
    pub directory: Option<PathBuf>,

    #[argh(switch)]
    /// disable colored output.
    pub no_color: bool,

    #[argh(switch)]
    /// enable the `mail` command with the default task queue in the temp directory.
    pub mail: bool,

    #[argh(option)]
    /// enable the `mail` command and append its tasks to this file.
    pub mail_queue: Option<PathBuf>,
}

/// Startup settings derived from [`Args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub start_dir: Option<PathBuf>,
    pub color: bool,
    pub mail_queue: Option<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mail_queue = match (args.mail_queue, args.mail) {
            (Some(path), _) => Some(path),
            (None, true) => Some(FileTaskSink::default_path()),
            (None, false) => None,
        };
        Self {
            start_dir: args.directory,
            color: !args.no_color,
            mail_queue,
        }
    }
}

impl Config {
    /// Parse the process arguments, exiting with usage text on error.
    pub fn from_env() -> Self {
        argh::from_env::<Args>().into()
    }
}
