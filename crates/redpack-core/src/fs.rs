//! File system abstraction for testability.
//!
//! Ingestion and export only touch the disk through the [`FileSystem`] trait.
//! [`RealFileSystem`] is backed by `std::fs` and `walkdir`; [`MemoryFileSystem`]
//! keeps everything in memory and can simulate unreadable or read-only
//! directories, so walk failures can be tested without chmod tricks.
//!
//! # Example
//!
//! ```rust,ignore
//! use redpack_core::fs::{FileSystem, MemoryFileSystem};
//!
//! let fs = MemoryFileSystem::new();
//! fs.add_file("/kits/808/kick_01.wav", b"RIFF");
//! for item in fs.walk(Path::new("/kits")) {
//!     println!("{item:?}");
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use walkdir::WalkDir;

use crate::error::FileSystemError;

/// Result of a file system operation.
pub type FsResult<T> = std::result::Result<T, FileSystemError>;

/// Kind of an entry produced by a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory (the walk descends into it).
    Directory,
    /// A regular file.
    File,
}

/// One entry visited during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Distance from the walk root (root itself is 0).
    pub depth: usize,
    /// Entry kind.
    pub kind: EntryKind,
}

/// A walk step that failed; the walk continues after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkFailure {
    /// Path the failure refers to.
    pub path: PathBuf,
    /// Whether the failing path is a directory whose listing failed.
    pub is_directory: bool,
    /// Human readable reason.
    pub reason: String,
}

/// Item yielded by [`FileSystem::walk`].
pub type WalkItem = std::result::Result<WalkEntry, WalkFailure>;

/// Abstraction over the file system operations the library needs.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Copy `src` to `dst`, failing if `dst` already exists.
    ///
    /// Returns the number of bytes copied.
    fn copy_new(&self, src: &Path, dst: &Path) -> FsResult<u64>;

    /// Walk `root` depth-first, visiting siblings in file name order.
    ///
    /// The root itself is yielded first at depth 0. A directory that cannot
    /// be listed yields a [`WalkFailure`] and the walk carries on with its
    /// siblings.
    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkItem> + Send + 'a>;
}

/// Real file system implementation using `std::fs` and `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new real file system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn copy_new(&self, src: &Path, dst: &Path) -> FsResult<u64> {
        let mut reader = File::open(src).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileSystemError::NotFound {
                path: src.to_path_buf(),
            },
            _ => FileSystemError::ReadFailed {
                path: src.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        // create_new makes the existence check and the create a single step
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dst)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FileSystemError::AlreadyExists {
                    path: dst.to_path_buf(),
                },
                _ => FileSystemError::WriteFailed {
                    path: dst.to_path_buf(),
                    reason: e.to_string(),
                },
            })?;

        match io::copy(&mut reader, &mut writer) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                drop(writer);
                // Do not leave a truncated file behind.
                let _ = fs::remove_file(dst);
                Err(FileSystemError::WriteFailed {
                    path: dst.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkItem> + Send + 'a> {
        let root = root.to_path_buf();
        let iter = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |item| match item {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let kind = if file_type.is_dir() {
                        EntryKind::Directory
                    } else if file_type.is_file() {
                        EntryKind::File
                    } else {
                        return None;
                    };
                    let depth = entry.depth();
                    Some(Ok(WalkEntry {
                        path: entry.into_path(),
                        depth,
                        kind,
                    }))
                }
                Err(e) => {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    Some(Err(WalkFailure {
                        is_directory: path.is_dir(),
                        path,
                        reason: e
                            .io_error()
                            .map_or_else(|| e.to_string(), ToString::to_string),
                    }))
                }
            });
        Box::new(iter)
    }
}

/// In-memory file system for tests and previews.
///
/// Cloning shares the same underlying tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    inner: Arc<RwLock<MemoryTree>>,
}

#[derive(Debug, Default)]
struct MemoryTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
    read_only: HashSet<PathBuf>,
}

impl MemoryTree {
    fn add_dir(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn children(&self, dir: &Path) -> BTreeSet<PathBuf> {
        let files = self.files.keys().filter(|p| p.parent() == Some(dir));
        let dirs = self
            .dirs
            .iter()
            .filter(|p| p.parent() == Some(dir) && p.as_path() != dir);
        files.chain(dirs).cloned().collect()
    }

    fn visit(&self, dir: &Path, depth: usize, out: &mut Vec<WalkItem>) {
        if self.unreadable.contains(dir) {
            out.push(Err(WalkFailure {
                path: dir.to_path_buf(),
                is_directory: true,
                reason: "permission denied".to_string(),
            }));
            return;
        }
        for child in self.children(dir) {
            if self.dirs.contains(&child) {
                out.push(Ok(WalkEntry {
                    path: child.clone(),
                    depth: depth + 1,
                    kind: EntryKind::Directory,
                }));
                self.visit(&child, depth + 1, out);
            } else {
                out.push(Ok(WalkEntry {
                    path: child,
                    depth: depth + 1,
                    kind: EntryKind::File,
                }));
            }
        }
    }
}

impl MemoryFileSystem {
    /// Create a new empty in-memory file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_tree(&self) -> std::sync::RwLockReadGuard<'_, MemoryTree> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> std::sync::RwLockWriteGuard<'_, MemoryTree> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &[u8]) {
        let path = path.as_ref();
        let mut tree = self.write_tree();
        if let Some(parent) = path.parent() {
            tree.add_dir(parent);
        }
        tree.files.insert(path.to_path_buf(), contents.to_vec());
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.write_tree().add_dir(path.as_ref());
    }

    /// Make listing `path` fail during walks.
    pub fn mark_unreadable(&self, path: impl AsRef<Path>) {
        self.write_tree()
            .unreadable
            .insert(path.as_ref().to_path_buf());
    }

    /// Make writes into `path` fail.
    pub fn mark_read_only(&self, path: impl AsRef<Path>) {
        self.write_tree()
            .read_only
            .insert(path.as_ref().to_path_buf());
    }

    /// Read back a file's contents.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.read_tree().files.get(path.as_ref()).cloned()
    }

    /// Number of files currently stored.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.read_tree().files.len()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let tree = self.read_tree();
        tree.files.contains_key(path) || tree.dirs.contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.read_tree().files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.read_tree().dirs.contains(path)
    }

    fn copy_new(&self, src: &Path, dst: &Path) -> FsResult<u64> {
        let mut tree = self.write_tree();
        let contents = tree
            .files
            .get(src)
            .cloned()
            .ok_or_else(|| FileSystemError::NotFound {
                path: src.to_path_buf(),
            })?;
        if tree.files.contains_key(dst) || tree.dirs.contains(dst) {
            return Err(FileSystemError::AlreadyExists {
                path: dst.to_path_buf(),
            });
        }
        match dst.parent() {
            Some(parent) if tree.read_only.contains(parent) => {
                return Err(FileSystemError::WriteFailed {
                    path: dst.to_path_buf(),
                    reason: "read-only directory".to_string(),
                });
            }
            Some(parent) if !tree.dirs.contains(parent) => {
                return Err(FileSystemError::WriteFailed {
                    path: dst.to_path_buf(),
                    reason: "parent directory does not exist".to_string(),
                });
            }
            _ => {}
        }
        let len = contents.len() as u64;
        tree.files.insert(dst.to_path_buf(), contents);
        Ok(len)
    }

    fn walk<'a>(&'a self, root: &Path) -> Box<dyn Iterator<Item = WalkItem> + Send + 'a> {
        let tree = self.read_tree();
        let mut items = Vec::new();
        if tree.files.contains_key(root) {
            items.push(Ok(WalkEntry {
                path: root.to_path_buf(),
                depth: 0,
                kind: EntryKind::File,
            }));
        } else if tree.dirs.contains(root) {
            items.push(Ok(WalkEntry {
                path: root.to_path_buf(),
                depth: 0,
                kind: EntryKind::Directory,
            }));
            tree.visit(root, 0, &mut items);
        } else {
            items.push(Err(WalkFailure {
                path: root.to_path_buf(),
                is_directory: false,
                reason: "no such file or directory".to_string(),
            }));
        }
        Box::new(items.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[WalkItem]) -> Vec<PathBuf> {
        items
            .iter()
            .filter_map(|i| i.as_ref().ok().map(|e| e.path.clone()))
            .collect()
    }

    #[test]
    fn test_memory_walk_is_depth_first_sorted() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/kits/b.wav", b"b");
        fs.add_file("/kits/a/z.wav", b"z");
        fs.add_file("/kits/a/y.wav", b"y");

        let items: Vec<_> = fs.walk(Path::new("/kits")).collect();
        assert_eq!(
            paths(&items),
            vec![
                PathBuf::from("/kits"),
                PathBuf::from("/kits/a"),
                PathBuf::from("/kits/a/y.wav"),
                PathBuf::from("/kits/a/z.wav"),
                PathBuf::from("/kits/b.wav"),
            ]
        );
    }

    #[test]
    fn test_memory_walk_reports_unreadable_and_continues() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/kits/locked/kick.wav", b"k");
        fs.add_file("/kits/open/snare.wav", b"s");
        fs.mark_unreadable("/kits/locked");

        let items: Vec<_> = fs.walk(Path::new("/kits")).collect();
        let failures: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, PathBuf::from("/kits/locked"));
        assert!(failures[0].is_directory);
        assert!(paths(&items).contains(&PathBuf::from("/kits/open/snare.wav")));
        assert!(!paths(&items).contains(&PathBuf::from("/kits/locked/kick.wav")));
    }

    #[test]
    fn test_memory_walk_missing_root() {
        let fs = MemoryFileSystem::new();
        let items: Vec<_> = fs.walk(Path::new("/nowhere")).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn test_memory_copy_new_refuses_overwrite() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/src/kick.wav", b"new");
        fs.add_file("/dst/kick.wav", b"old");

        let err = fs
            .copy_new(Path::new("/src/kick.wav"), Path::new("/dst/kick.wav"))
            .unwrap_err();
        assert!(matches!(err, FileSystemError::AlreadyExists { .. }));
        assert_eq!(fs.contents("/dst/kick.wav"), Some(b"old".to_vec()));
    }

    #[test]
    fn test_memory_copy_new_read_only() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/src/kick.wav", b"k");
        fs.add_dir("/dst");
        fs.mark_read_only("/dst");

        let err = fs
            .copy_new(Path::new("/src/kick.wav"), Path::new("/dst/kick.wav"))
            .unwrap_err();
        assert!(matches!(err, FileSystemError::WriteFailed { .. }));
    }

    #[test]
    fn test_real_copy_new() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("clap.wav");
        let dst_dir = dir.path().join("out");
        std::fs::write(&src, b"clap").unwrap();
        std::fs::create_dir(&dst_dir).unwrap();

        let fs = RealFileSystem::new();
        let bytes = fs.copy_new(&src, &dst_dir.join("clap.wav")).unwrap();
        assert_eq!(bytes, 4);

        let err = fs.copy_new(&src, &dst_dir.join("clap.wav")).unwrap_err();
        assert!(matches!(err, FileSystemError::AlreadyExists { .. }));
    }

    #[test]
    fn test_real_copy_new_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFileSystem::new();
        let err = fs
            .copy_new(&dir.path().join("gone.wav"), &dir.path().join("x.wav"))
            .unwrap_err();
        assert!(matches!(err, FileSystemError::NotFound { .. }));
    }

    #[test]
    fn test_real_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/tom.wav"), b"t").unwrap();
        std::fs::write(dir.path().join("a.wav"), b"a").unwrap();

        let fs = RealFileSystem::new();
        let items: Vec<_> = fs.walk(dir.path()).collect();
        let found = paths(&items);
        assert_eq!(found[0], dir.path());
        assert_eq!(found[1], dir.path().join("a.wav"));
        assert_eq!(found[2], dir.path().join("sub"));
        assert_eq!(found[3], dir.path().join("sub/tom.wav"));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_walk_maps_link_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kick.wav"), b"k").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.wav"), dir.path().join("ghost.wav"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let items: Vec<_> = RealFileSystem::new().walk(dir.path()).collect();
        let failures: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
        assert_eq!(failures.len(), 2);

        assert_eq!(failures[0].path, dir.path().join("ghost.wav"));
        assert!(!failures[0].is_directory);
        assert_eq!(failures[1].path, dir.path().join("loop"));
        assert!(failures[1].is_directory);

        assert!(paths(&items).contains(&dir.path().join("kick.wav")));
    }
}
