//! Path confinement.
//!
//! [`PathGuard`] is the only producer of [`ResolvedPath`]. A resolved path is
//! absolute, free of `.`/`..` components, has every existing symlink in it
//! resolved, and lies at or below the jail root.

use crate::error::GuardError;
use crate::fs::FileSystem;
use log::warn;
use soft_canonicalize::soft_canonicalize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A path that passed the containment check.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Re-wrap a path found by walking below an already resolved directory.
    ///
    /// Only the grep walker uses this, and only for non-symlink entries, so
    /// the child cannot leave the parent's subtree.
    pub(crate) fn child_of(parent: &ResolvedPath, path: PathBuf) -> Option<Self> {
        path.starts_with(&parent.0).then_some(ResolvedPath(path))
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

/// Confines paths to a jail root fixed at construction.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard for `root`. Fails when `root` can't be canonicalized.
    pub fn new(fs: &dyn FileSystem, root: impl Into<PathBuf>) -> Result<Self, GuardError> {
        let root = root.into();
        let root = fs
            .canonicalize(&root)
            .map_err(|source| GuardError::InvalidJail { jail: root, source })?;
        Ok(Self { root })
    }

    /// The canonical jail root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `candidate` (relative to the current directory of `fs`) and
    /// check that it stays inside the jail.
    pub fn resolve(
        &self,
        fs: &dyn FileSystem,
        candidate: impl AsRef<Path>,
    ) -> Result<ResolvedPath, GuardError> {
        resolve(fs, &self.root, candidate.as_ref())
    }
}

/// Resolve `candidate` against the working directory of `fs` and confine it to `base`.
///
/// `base` is canonicalized on every call; a jail root that has disappeared
/// fails with [`GuardError::InvalidJail`] instead of letting anything through.
pub fn resolve(
    fs: &dyn FileSystem,
    base: &Path,
    candidate: &Path,
) -> Result<ResolvedPath, GuardError> {
    let base = fs
        .canonicalize(base)
        .map_err(|source| GuardError::InvalidJail {
            jail: base.to_path_buf(),
            source,
        })?;
    let resolved = weakly_canonical(fs, candidate)?;

    if resolved.ancestors().any(|ancestor| ancestor == base) {
        Ok(ResolvedPath(resolved))
    } else {
        warn!(
            "rejected {} (resolved to {}), jail is {}",
            candidate.display(),
            resolved.display(),
            base.display()
        );
        Err(GuardError::NotAccessible {
            attempted: resolved,
            jail: base,
        })
    }
}

/// Canonicalize a path that may not exist.
///
/// Relative input is joined to the working directory of `fs`. Existing
/// components are resolved on disk, symlinks included, even when a link's
/// target is missing. The non-existing tail is folded lexically.
pub fn weakly_canonical(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf, GuardError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = fs.current_dir().map_err(|source| GuardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };
    soft_canonicalize(&absolute).map_err(|source| GuardError::Io {
        path: absolute,
        source,
    })
}

/// Express `path` relative to `base`, climbing with `..` where needed.
///
/// Both paths are expected to be absolute and canonical.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();

    while let (Some(a), Some(b)) = (path_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        path_parts.next();
        base_parts.next();
    }

    let mut relative: PathBuf = base_parts.map(|_| Component::ParentDir).collect();
    relative.extend(path_parts);
    if relative.as_os_str().is_empty() {
        relative.push(Component::CurDir);
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use std::fs;
    use tempfile::TempDir;

    /// jail/ holds sub/inner/ and file.txt; a sibling directory sits next to jail/.
    fn layout() -> (TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let jail = temp.path().join("jail");
        fs::create_dir_all(jail.join("sub").join("inner")).unwrap();
        fs::create_dir_all(temp.path().join("sibling")).unwrap();
        fs::write(jail.join("file.txt"), "x").unwrap();
        fs::write(temp.path().join("sibling").join("secret.txt"), "s").unwrap();
        (temp, fs::canonicalize(jail).unwrap())
    }

    #[test]
    fn test_root_and_descendants_are_accessible() {
        let (_temp, jail) = layout();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        for candidate in [".", "sub", "sub/inner", "./sub/../file.txt", "missing/new.txt"] {
            let resolved = guard.resolve(&osfs, candidate).unwrap();
            assert!(resolved.as_path().starts_with(&jail), "{candidate}");
        }

        let absolute = guard.resolve(&osfs, jail.join("sub")).unwrap();
        assert_eq!(absolute.as_path(), jail.join("sub"));
    }

    #[test]
    fn test_escapes_are_rejected() {
        let (_temp, jail) = layout();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        for candidate in ["..", "../sibling", "sub/../../sibling/secret.txt", "/", "/etc/passwd"] {
            let err = guard.resolve(&osfs, candidate).unwrap_err();
            assert!(
                matches!(err, GuardError::NotAccessible { .. }),
                "{candidate}: {err:?}"
            );
        }
    }

    #[test]
    fn test_reentering_traversal_is_resolved_not_rejected() {
        let (_temp, jail) = layout();
        let osfs = OsFileSystem::detached(jail.join("sub")).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        let resolved = guard.resolve(&osfs, "../../jail/sub/../file.txt").unwrap();
        assert_eq!(resolved.as_path(), jail.join("file.txt"));
    }

    #[test]
    fn test_relative_candidates_follow_the_working_directory() {
        let (_temp, jail) = layout();
        let osfs = OsFileSystem::detached(jail.join("sub")).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        let resolved = guard.resolve(&osfs, "inner").unwrap();
        assert_eq!(resolved.as_path(), jail.join("sub").join("inner"));
        assert!(guard.resolve(&osfs, "../..").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_jail_is_rejected() {
        let (temp, jail) = layout();
        std::os::unix::fs::symlink(temp.path().join("sibling"), jail.join("escape")).unwrap();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        assert!(guard.resolve(&osfs, "escape").is_err());
        assert!(guard.resolve(&osfs, "escape/secret.txt").is_err());
        assert!(guard.resolve(&osfs, "escape/not-there").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_out_of_jail_is_rejected() {
        let (temp, jail) = layout();
        let target = temp.path().join("sibling").join("new.txt");
        std::os::unix::fs::symlink(&target, jail.join("dangling")).unwrap();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        let err = guard.resolve(&osfs, "dangling").unwrap_err();
        assert!(matches!(err, GuardError::NotAccessible { .. }), "{err:?}");
        assert!(guard.resolve(&osfs, "sub/../dangling").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_inside_jail_is_accessible() {
        let (_temp, jail) = layout();
        std::os::unix::fs::symlink(jail.join("later.txt"), jail.join("pending")).unwrap();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let guard = PathGuard::new(&osfs, &jail).unwrap();

        let resolved = guard.resolve(&osfs, "pending").unwrap();
        assert!(resolved.as_path().starts_with(&jail));
    }

    #[test]
    fn test_missing_jail_is_a_configuration_error() {
        let temp = tempfile::tempdir().unwrap();
        let osfs = OsFileSystem::detached(temp.path()).unwrap();
        let err = PathGuard::new(&osfs, temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, GuardError::InvalidJail { .. }));

        let err = resolve(&osfs, &temp.path().join("nope"), Path::new(".")).unwrap_err();
        assert!(matches!(err, GuardError::InvalidJail { .. }));
    }

    #[test]
    fn test_weakly_canonical_folds_missing_tail() {
        let (_temp, jail) = layout();
        let osfs = OsFileSystem::detached(&jail).unwrap();
        let path = weakly_canonical(&osfs, Path::new("a/b/../c/./d")).unwrap();
        assert_eq!(path, jail.join("a").join("c").join("d"));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/a/b/c.txt"), Path::new("/a")),
            PathBuf::from("b/c.txt")
        );
        assert_eq!(
            relative_to(Path::new("/a/x.txt"), Path::new("/a/b")),
            PathBuf::from("../x.txt")
        );
        assert_eq!(relative_to(Path::new("/a"), Path::new("/a")), PathBuf::from("."));
    }
}
