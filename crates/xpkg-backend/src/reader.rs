//! Concatenates a directory tree of YAML files into one document stream.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use xpkg_core::DocumentStream;

use crate::error::FsResult;
use crate::filter::{should_skip, FilterFn};
use crate::fs::FileSystem;

/// Written between consecutive files so that a file missing its trailing
/// newline cannot merge into the next one.
const FILE_SEPARATOR: &[u8] = b"\n---\n";

/// Where an [`FsReader`] was when it last produced bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsReaderAnnotation {
    pub path: PathBuf,
    /// Bytes of `path` read so far.
    pub position: u64,
}

impl fmt::Display for FsReaderAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {} at byte {}", self.path.display(), self.position)
    }
}

/// Reads every file under a root that survives the skip filters, in walk
/// order, opening each one only when the previous one is exhausted.
pub struct FsReader {
    fs: Arc<dyn FileSystem>,
    paths: Vec<PathBuf>,
    /// Index into `paths` of the file being read.
    index: usize,
    current: Option<Box<dyn Read + Send>>,
    /// Separator bytes still owed before the next file.
    pending_separator: &'static [u8],
    position: u64,
    last: Option<FsReaderAnnotation>,
}

impl FsReader {
    /// Walk `root` and keep the files no filter skips.
    ///
    /// Directories that are not skipped are still never read; only their
    /// contents are.
    pub fn new(fs: Arc<dyn FileSystem>, root: &Path, filters: &[FilterFn]) -> FsResult<Self> {
        let mut paths = Vec::new();
        for entry in fs.walk(root)? {
            if should_skip(filters, &entry)? {
                trace!(path = %entry.path.display(), "skipping");
                continue;
            }
            if !entry.is_dir {
                paths.push(entry.path);
            }
        }
        debug!(root = %root.display(), files = paths.len(), "collected package files");

        Ok(Self {
            fs,
            paths,
            index: 0,
            current: None,
            pending_separator: &[],
            position: 0,
            last: None,
        })
    }

    /// Files that will be read, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The file and offset of the most recent read, if any.
    pub fn position(&self) -> Option<&FsReaderAnnotation> {
        self.last.as_ref()
    }

    fn open_current(&mut self) -> io::Result<bool> {
        if self.current.is_some() {
            return Ok(true);
        }
        let Some(path) = self.paths.get(self.index) else {
            return Ok(false);
        };
        self.current = Some(self.fs.open(path)?);
        self.position = 0;
        Ok(true)
    }
}

impl fmt::Debug for FsReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsReader")
            .field("paths", &self.paths)
            .field("index", &self.index)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl Read for FsReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.pending_separator.is_empty() {
                let n = self.pending_separator.len().min(buf.len());
                buf[..n].copy_from_slice(&self.pending_separator[..n]);
                self.pending_separator = &self.pending_separator[n..];
                return Ok(n);
            }

            if !self.open_current()? {
                return Ok(0);
            }
            let Some(file) = self.current.as_mut() else {
                return Ok(0);
            };

            let n = file.read(buf)?;
            if n > 0 {
                self.position += n as u64;
                self.last = Some(FsReaderAnnotation {
                    path: self.paths[self.index].clone(),
                    position: self.position,
                });
                return Ok(n);
            }

            self.current = None;
            self.index += 1;
            if self.index < self.paths.len() {
                self.pending_separator = FILE_SEPARATOR;
            }
        }
    }
}

impl DocumentStream for FsReader {
    fn annotation(&self) -> Option<String> {
        self.last.as_ref().map(ToString::to_string)
    }

    fn close(&mut self) -> io::Result<()> {
        self.current = None;
        self.index = self.paths.len();
        self.pending_separator = &[];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{skip_dirs, skip_empty, skip_not_yaml, skip_path};
    use crate::fs::MemFs;

    fn fixture() -> Arc<dyn FileSystem> {
        Arc::new(
            MemFs::new()
                .with_file("pkg/crossplane.yaml", "kind: Provider")
                .unwrap()
                .with_file("pkg/crds/a.yaml", "kind: A\n")
                .unwrap()
                .with_file("pkg/crds/empty.yaml", "")
                .unwrap()
                .with_file("pkg/README.md", "# readme\n")
                .unwrap()
                .with_file("pkg/.up/cache.yaml", "kind: Cache\n")
                .unwrap(),
        )
    }

    fn read_all(reader: &mut FsReader) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn concatenates_with_separators() {
        let filters = [skip_dirs(), skip_empty(), skip_not_yaml()];
        let mut reader = FsReader::new(fixture(), Path::new("pkg/crds"), &filters).unwrap();
        assert_eq!(read_all(&mut reader), "kind: A\n");

        let filters = [skip_not_yaml(), skip_path(".up").unwrap(), skip_path("cache.yaml").unwrap()];
        let mut reader = FsReader::new(fixture(), Path::new("pkg"), &filters).unwrap();
        assert_eq!(
            reader.paths(),
            &[
                PathBuf::from("pkg/crds/a.yaml"),
                PathBuf::from("pkg/crds/empty.yaml"),
                PathBuf::from("pkg/crossplane.yaml"),
            ]
        );
        assert_eq!(read_all(&mut reader), "kind: A\n\n---\n\n---\nkind: Provider");
    }

    #[test]
    fn skipping_a_directory_keeps_its_files() {
        let mut reader = FsReader::new(fixture(), Path::new("pkg"), &[skip_dirs()]).unwrap();
        assert_eq!(reader.paths().len(), 5);
        assert!(read_all(&mut reader).contains("kind: Cache"));
    }

    #[test]
    fn annotation_tracks_last_read() {
        let filters = [skip_empty(), skip_not_yaml(), skip_path("cache.yaml").unwrap()];
        let mut reader = FsReader::new(fixture(), Path::new("pkg"), &filters).unwrap();
        assert!(reader.annotation().is_none());

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(
            reader.annotation().as_deref(),
            Some("file pkg/crds/a.yaml at byte 4")
        );

        read_all(&mut reader);
        assert_eq!(
            reader.position(),
            Some(&FsReaderAnnotation {
                path: PathBuf::from("pkg/crossplane.yaml"),
                position: 14,
            })
        );
    }

    #[test]
    fn small_buffers_split_the_separator() {
        let fs: Arc<dyn FileSystem> = Arc::new(
            MemFs::new()
                .with_file("d/a.yaml", "a: 1")
                .unwrap()
                .with_file("d/b.yaml", "b: 2")
                .unwrap(),
        );
        let mut reader = FsReader::new(fs, Path::new("d"), &[]).unwrap();
        let mut out = Vec::new();
        let mut buf = [0u8; 1];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"a: 1\n---\nb: 2");
    }

    #[test]
    fn missing_root_fails_at_construction() {
        assert!(FsReader::new(fixture(), Path::new("nope"), &[]).is_err());
    }

    #[test]
    fn close_ends_the_stream() {
        let mut reader = FsReader::new(fixture(), Path::new("pkg"), &[]).unwrap();
        reader.close().unwrap();
        assert_eq!(read_all(&mut reader), "");
    }
}
