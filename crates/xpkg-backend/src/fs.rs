//! Filesystem abstraction for the filesystem backend.
//!
//! [`OsFs`] walks the real filesystem with `walkdir`; [`MemFs`] keeps files
//! in memory for tests and for packages assembled on the fly.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use walkdir::WalkDir;

use crate::error::{FsError, FsResult};

/// One entry found while walking a directory tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// Size in bytes; zero for directories.
    pub len: u64,
}

impl FileEntry {
    pub fn file(path: impl Into<PathBuf>, len: u64) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            len,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            len: 0,
        }
    }
}

/// A read-only view of a filesystem.
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Every entry at or beneath `root`, including `root` itself, in
    /// depth-first order with siblings sorted by name.
    fn walk(&self, root: &Path) -> FsResult<Vec<FileEntry>>;

    /// Open a file for reading.
    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send>>;
}

/// The host filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn walk(&self, root: &Path) -> FsResult<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(FileEntry {
                path: entry.into_path(),
                is_dir: metadata.is_dir(),
                len: if metadata.is_dir() { 0 } else { metadata.len() },
            });
        }
        Ok(entries)
    }

    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        if path.is_dir() {
            return Err(FsError::IsDirectory(path.to_path_buf()));
        }
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            _ => FsError::Io(e),
        })?;
        Ok(Box::new(file))
    }
}

/// An in-memory filesystem. Directories exist implicitly as file parents.
#[derive(Debug, Default)]
pub struct MemFs {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file.
    pub fn write_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> FsResult<()> {
        let mut files = self.files.write().map_err(|e| {
            FsError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("lock poisoned: {e}"),
            ))
        })?;
        files.insert(path.into(), contents.into());
        Ok(())
    }

    /// Builder-style [`Self::write_file`] for tests and fixtures.
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> FsResult<Self> {
        self.write_file(path, contents)?;
        Ok(self)
    }

    fn read_files(&self) -> FsResult<std::sync::RwLockReadGuard<'_, BTreeMap<PathBuf, Vec<u8>>>> {
        self.files.read().map_err(|e| {
            FsError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("lock poisoned: {e}"),
            ))
        })
    }
}

impl FileSystem for MemFs {
    fn walk(&self, root: &Path) -> FsResult<Vec<FileEntry>> {
        let files = self.read_files()?;

        if let Some(contents) = files.get(root) {
            return Ok(vec![FileEntry::file(root, contents.len() as u64)]);
        }

        // PathBuf ordering is component-wise, which is the same depth-first,
        // name-sorted order walkdir produces.
        let mut entries: BTreeMap<PathBuf, FileEntry> = BTreeMap::new();
        for (path, contents) in files.iter() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let mut dir = root.to_path_buf();
            entries.insert(dir.clone(), FileEntry::dir(&dir));
            let components: Vec<_> = relative.components().collect();
            if let Some((_, parents)) = components.split_last() {
                for component in parents {
                    dir.push(component);
                    entries.insert(dir.clone(), FileEntry::dir(&dir));
                }
            }
            entries.insert(path.clone(), FileEntry::file(path, contents.len() as u64));
        }

        if entries.is_empty() {
            return Err(FsError::NotFound(root.to_path_buf()));
        }
        Ok(entries.into_values().collect())
    }

    fn open(&self, path: &Path) -> FsResult<Box<dyn Read + Send>> {
        let files = self.read_files()?;
        match files.get(path) {
            Some(contents) => Ok(Box::new(Cursor::new(contents.clone()))),
            None if files.keys().any(|p| p.starts_with(path)) => {
                Err(FsError::IsDirectory(path.to_path_buf()))
            }
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(entries: &[FileEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| {
                let mut s = e.path.display().to_string();
                if e.is_dir {
                    s.push('/');
                }
                s
            })
            .collect()
    }

    #[test]
    fn memfs_walk_is_depth_first_and_sorted() {
        let fs = MemFs::new()
            .with_file("pkg/crossplane.yaml", "kind: Provider\n")
            .unwrap()
            .with_file("pkg/crds/b.yaml", "kind: B\n")
            .unwrap()
            .with_file("pkg/crds/a.yaml", "kind: A\n")
            .unwrap()
            .with_file("other/ignored.yaml", "kind: X\n")
            .unwrap();

        let entries = fs.walk(Path::new("pkg")).unwrap();
        assert_eq!(
            paths(&entries),
            vec![
                "pkg/",
                "pkg/crds/",
                "pkg/crds/a.yaml",
                "pkg/crds/b.yaml",
                "pkg/crossplane.yaml",
            ]
        );
        assert_eq!(entries[4].len, 15);
    }

    #[test]
    fn memfs_walk_missing_root() {
        let fs = MemFs::new();
        assert!(matches!(fs.walk(Path::new("nope")), Err(FsError::NotFound(_))));
    }

    #[test]
    fn memfs_walk_file_root() {
        let fs = MemFs::new().with_file("one.yaml", "a: b\n").unwrap();
        let entries = fs.walk(Path::new("one.yaml")).unwrap();
        assert_eq!(entries, vec![FileEntry::file("one.yaml", 5)]);
    }

    #[test]
    fn memfs_open() {
        let fs = MemFs::new().with_file("dir/f.yaml", "x: 1\n").unwrap();
        let mut out = String::new();
        fs.open(Path::new("dir/f.yaml"))
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "x: 1\n");
        assert!(matches!(fs.open(Path::new("dir")), Err(FsError::IsDirectory(_))));
        assert!(matches!(fs.open(Path::new("dir/g.yaml")), Err(FsError::NotFound(_))));
    }

    #[test]
    fn osfs_walk_matches_memfs_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("crds")).unwrap();
        std::fs::write(dir.path().join("crossplane.yaml"), "kind: Provider\n").unwrap();
        std::fs::write(dir.path().join("crds/b.yaml"), "kind: B\n").unwrap();
        std::fs::write(dir.path().join("crds/a.yaml"), "kind: A\n").unwrap();

        let entries = OsFs.walk(dir.path()).unwrap();
        let relative: Vec<_> = entries
            .iter()
            .map(|e| e.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::new(),
                PathBuf::from("crds"),
                PathBuf::from("crds/a.yaml"),
                PathBuf::from("crds/b.yaml"),
                PathBuf::from("crossplane.yaml"),
            ]
        );
        assert!(entries[0].is_dir);
        assert_eq!(entries[4].len, 15);
    }

    #[test]
    fn osfs_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OsFs.open(&dir.path().join("missing.yaml")),
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(OsFs.open(dir.path()), Err(FsError::IsDirectory(_))));
    }
}
