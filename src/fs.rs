//! Filesystem access used by the builtins.
//!
//! Every handler goes through [`FileSystem`] so the working directory can live
//! either in the process (the interactive shell) or in memory (tests and
//! embedders that must not disturb the process cwd).

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: OsString,
    pub path: PathBuf,
    /// True for directories and for symlinks pointing at directories.
    pub is_dir: bool,
    /// True only for regular files that are not symlinks.
    pub is_plain_file: bool,
    pub is_symlink: bool,
}

/// Narrow filesystem interface consumed by the shell core.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    fn is_regular_file(&self, path: &Path) -> bool;

    /// Direct children of `dir` in directory order.
    fn list_children(&self, dir: &Path) -> io::Result<Vec<ChildEntry>>;

    /// Open `path` for streaming its raw bytes.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    fn current_dir(&self) -> io::Result<PathBuf>;

    fn set_current_dir(&mut self, dir: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone)]
enum Cwd {
    Process,
    Detached(PathBuf),
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    cwd: Cwd,
}

impl OsFileSystem {
    /// Use the real process working directory; `cd` calls `std::env::set_current_dir`.
    pub fn process() -> Self {
        Self { cwd: Cwd::Process }
    }

    /// Keep the working directory in memory, starting at `start`.
    pub fn detached(start: impl AsRef<Path>) -> io::Result<Self> {
        let start = fs::canonicalize(start.as_ref())?;
        if !start.is_dir() {
            return Err(not_a_directory(&start));
        }
        Ok(Self {
            cwd: Cwd::Detached(start),
        })
    }
}

fn not_a_directory(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("{}: Not a directory", path.display()),
    )
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_children(&self, dir: &Path) -> io::Result<Vec<ChildEntry>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            let is_symlink = file_type.is_symlink();
            // Dangling links are listed as plain names.
            let is_dir = if is_symlink {
                path.is_dir()
            } else {
                file_type.is_dir()
            };
            children.push(ChildEntry {
                name: entry.file_name(),
                path,
                is_dir,
                is_plain_file: file_type.is_file(),
                is_symlink,
            });
        }
        Ok(children)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        match &self.cwd {
            Cwd::Process => std::env::current_dir(),
            Cwd::Detached(dir) => Ok(dir.clone()),
        }
    }

    fn set_current_dir(&mut self, dir: &Path) -> io::Result<()> {
        match &mut self.cwd {
            Cwd::Process => std::env::set_current_dir(dir),
            Cwd::Detached(current) => {
                let target = fs::canonicalize(current.join(dir))?;
                if !target.is_dir() {
                    return Err(not_a_directory(&target));
                }
                *current = target;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_detached_cwd_moves_without_touching_process() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("inner")).unwrap();
        let before = std::env::current_dir().unwrap();

        let mut osfs = OsFileSystem::detached(temp.path()).unwrap();
        osfs.set_current_dir(Path::new("inner")).unwrap();

        let expected = fs::canonicalize(temp.path().join("inner")).unwrap();
        assert_eq!(osfs.current_dir().unwrap(), expected);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_detached_cwd_rejects_files() {
        let temp = tempfile::tempdir().unwrap();
        File::create(temp.path().join("plain.txt")).unwrap();

        let mut osfs = OsFileSystem::detached(temp.path()).unwrap();
        let err = osfs.set_current_dir(Path::new("plain.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
    }

    #[test]
    fn test_list_children_classifies_entries() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        File::create(temp.path().join("file.txt")).unwrap();

        let osfs = OsFileSystem::detached(temp.path()).unwrap();
        let mut children = osfs.list_children(temp.path()).unwrap();
        children.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "dir");
        assert!(children[0].is_dir);
        assert!(!children[0].is_plain_file);
        assert_eq!(children[1].name, "file.txt");
        assert!(children[1].is_plain_file);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_children_marks_symlinks() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

        let osfs = OsFileSystem::detached(temp.path()).unwrap();
        let children = osfs.list_children(temp.path()).unwrap();
        let link = children.iter().find(|c| c.name == "link").unwrap();
        assert!(link.is_symlink);
        assert!(link.is_dir);
        assert!(!link.is_plain_file);
    }
}
