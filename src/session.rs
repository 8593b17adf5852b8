use crate::error::GuardError;
use crate::fs::FileSystem;
use crate::guard::{PathGuard, ResolvedPath};
use crate::style::{Palette, Style};
use crate::task_sink::TaskSink;
use std::path::{Path, PathBuf};

/// Suffix printed after the working directory in the prompt.
pub const PROMPT_SUFFIX: &str = ": > ";

/// Mutable state shared by all builtins for the lifetime of the shell.
///
/// - the jail root, fixed at construction;
/// - the filesystem service that also owns the working directory;
/// - `exit_requested`, set by `exit`;
/// - `input_good`, cleared when the input ended without `exit`.
pub struct Session {
    guard: PathGuard,
    fs: Box<dyn FileSystem>,
    palette: Palette,
    task_sink: Option<Box<dyn TaskSink>>,
    prompt: String,
    pub exit_requested: bool,
    pub input_good: bool,
}

impl Session {
    /// Create a session jailed to `jail_root`.
    pub fn new(fs: Box<dyn FileSystem>, jail_root: impl Into<PathBuf>) -> Result<Self, GuardError> {
        let guard = PathGuard::new(fs.as_ref(), jail_root)?;
        let mut session = Self {
            guard,
            fs,
            palette: Palette::default(),
            task_sink: None,
            prompt: String::new(),
            exit_requested: false,
            input_good: true,
        };
        session.update_prompt();
        Ok(session)
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self.update_prompt();
        self
    }

    pub fn with_task_sink(mut self, sink: Box<dyn TaskSink>) -> Self {
        self.task_sink = Some(sink);
        self
    }

    pub fn jail_root(&self) -> &Path {
        self.guard.root()
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn task_sink(&mut self) -> Option<&mut (dyn TaskSink + 'static)> {
        self.task_sink.as_deref_mut()
    }

    pub fn has_task_sink(&self) -> bool {
        self.task_sink.is_some()
    }

    /// Resolve a user supplied path and confine it to the jail.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> Result<ResolvedPath, GuardError> {
        self.guard.resolve(self.fs.as_ref(), candidate)
    }

    /// The working directory, read fresh from the filesystem service.
    pub fn current_dir(&self) -> std::io::Result<PathBuf> {
        self.fs.current_dir()
    }

    /// Move the working directory. Only `cd` calls this, and only with a
    /// resolved path.
    pub fn set_current_dir(&mut self, dir: &ResolvedPath) -> std::io::Result<()> {
        self.fs.set_current_dir(dir.as_path())?;
        self.update_prompt();
        Ok(())
    }

    /// Re-render the prompt from the current working directory.
    pub fn update_prompt(&mut self) {
        let cwd = self
            .fs
            .current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        self.prompt = format!("{}{}", self.palette.paint(Style::Prompt, &cwd), PROMPT_SUFFIX);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use std::fs;

    fn session_in(dir: &Path) -> Session {
        let osfs = OsFileSystem::detached(dir).unwrap();
        Session::new(Box::new(osfs), dir)
            .unwrap()
            .with_palette(Palette::plain())
    }

    #[test]
    fn test_new_session_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let session = session_in(temp.path());

        assert!(!session.exit_requested);
        assert!(session.input_good);
        assert!(!session.has_task_sink());
        assert_eq!(session.jail_root(), fs::canonicalize(temp.path()).unwrap());
    }

    #[test]
    fn test_prompt_tracks_working_directory() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        let mut session = session_in(temp.path());
        let root = fs::canonicalize(temp.path()).unwrap();
        assert_eq!(session.prompt(), format!("{}: > ", root.display()));

        let sub = session.resolve("sub").unwrap();
        session.set_current_dir(&sub).unwrap();
        assert_eq!(session.prompt(), format!("{}: > ", root.join("sub").display()));
        assert_eq!(session.current_dir().unwrap(), root.join("sub"));
    }

    #[test]
    fn test_jail_root_is_fixed_after_cd() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        let mut session = session_in(temp.path());

        let sub = session.resolve("sub").unwrap();
        session.set_current_dir(&sub).unwrap();

        assert_eq!(session.jail_root(), fs::canonicalize(temp.path()).unwrap());
        assert!(session.resolve("..").is_ok());
        assert!(session.resolve("../..").is_err());
    }
}
