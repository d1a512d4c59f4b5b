//! The backend capability and its local variants.

use std::fmt;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use xpkg_core::{Context, DocumentStream, ReaderStream};

use crate::error::BackendResult;
use crate::filter::FilterFn;
use crate::fs::{FileSystem, OsFs};
use crate::option::BackendOption;
use crate::reader::FsReader;

/// A producer of the byte stream a parser consumes.
///
/// Options can be supplied at construction and again at [`Backend::init`];
/// later options win. `init` may be called more than once and opens a new
/// stream each time.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Apply one option. Options meant for another backend are ignored.
    fn apply(&mut self, option: &BackendOption);

    /// Apply options in order.
    fn apply_all(&mut self, options: &[BackendOption]) {
        for option in options {
            self.apply(option);
        }
    }

    /// Apply `options`, then open the stream.
    async fn init(
        &mut self,
        ctx: &Context,
        options: &[BackendOption],
    ) -> BackendResult<Box<dyn DocumentStream>>;
}

/// Reads every non-skipped file beneath a directory as one stream.
///
/// No filters are installed by default; callers usually pass
/// [`skip_dirs`](crate::skip_dirs), [`skip_not_yaml`](crate::skip_not_yaml)
/// and friends through [`BackendOption::FsFilters`].
#[derive(Clone)]
pub struct FsBackend {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    filters: Vec<FilterFn>,
}

impl FsBackend {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            dir: PathBuf::from("."),
            filters: Vec::new(),
        }
    }

    pub fn with_options(fs: Arc<dyn FileSystem>, options: &[BackendOption]) -> Self {
        let mut backend = Self::new(fs);
        backend.apply_all(options);
        backend
    }

    /// A backend over the host filesystem.
    pub fn os() -> Self {
        Self::new(Arc::new(OsFs))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn filters(&self) -> &[FilterFn] {
        &self.filters
    }
}

impl fmt::Debug for FsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsBackend")
            .field("fs", &self.fs)
            .field("dir", &self.dir)
            .field("filters", &self.filters)
            .finish()
    }
}

#[async_trait]
impl Backend for FsBackend {
    fn apply(&mut self, option: &BackendOption) {
        match option {
            BackendOption::FsDir(dir) => self.dir = dir.clone(),
            BackendOption::FsFilters(filters) => self.filters = filters.clone(),
            _ => {}
        }
    }

    async fn init(
        &mut self,
        ctx: &Context,
        options: &[BackendOption],
    ) -> BackendResult<Box<dyn DocumentStream>> {
        self.apply_all(options);
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        debug!(dir = %self.dir.display(), filters = self.filters.len(), "opening package directory");
        let reader = FsReader::new(Arc::clone(&self.fs), &self.dir, &self.filters)?;
        Ok(Box::new(reader))
    }
}

/// Serves a fixed string. Every `init` starts again from the beginning.
#[derive(Clone, Debug, Default)]
pub struct EchoBackend {
    content: String,
}

impl EchoBackend {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[async_trait]
impl Backend for EchoBackend {
    fn apply(&mut self, _option: &BackendOption) {}

    async fn init(
        &mut self,
        _ctx: &Context,
        _options: &[BackendOption],
    ) -> BackendResult<Box<dyn DocumentStream>> {
        Ok(ReaderStream::new(Cursor::new(self.content.clone().into_bytes())).boxed())
    }
}

/// Produces an empty stream, for when no input is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopBackend;

#[async_trait]
impl Backend for NopBackend {
    fn apply(&mut self, _option: &BackendOption) {}

    async fn init(
        &mut self,
        _ctx: &Context,
        _options: &[BackendOption],
    ) -> BackendResult<Box<dyn DocumentStream>> {
        Ok(ReaderStream::new(io::empty()).boxed())
    }
}
