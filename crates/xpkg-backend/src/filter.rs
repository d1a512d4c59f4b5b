//! Skip filters for the filesystem backend.
//!
//! A filter returns `Ok(true)` to leave an entry out of the stream. Filters
//! only ever remove the entry they are given: skipping a directory does not
//! skip its contents.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::FsResult;
use crate::fs::FileEntry;

/// A predicate over walked entries; `true` means skip.
#[derive(Clone)]
pub struct FilterFn {
    name: &'static str,
    predicate: Arc<dyn Fn(&FileEntry) -> FsResult<bool> + Send + Sync>,
}

impl FilterFn {
    /// Wrap an arbitrary predicate. The name shows up in logs and `Debug`.
    pub fn new<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(&FileEntry) -> FsResult<bool> + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluate the filter against an entry.
    pub fn skip(&self, entry: &FileEntry) -> FsResult<bool> {
        (self.predicate)(entry)
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterFn").field(&self.name).finish()
    }
}

/// Skip directories.
pub fn skip_dirs() -> FilterFn {
    FilterFn::new("skip_dirs", |entry| Ok(entry.is_dir))
}

/// Skip zero-length files.
pub fn skip_empty() -> FilterFn {
    FilterFn::new("skip_empty", |entry| Ok(!entry.is_dir && entry.len == 0))
}

/// Skip files without a `.yaml` or `.yml` extension.
pub fn skip_not_yaml() -> FilterFn {
    FilterFn::new("skip_not_yaml", |entry| {
        let yaml = entry
            .path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        Ok(!entry.is_dir && !yaml)
    })
}

/// Skip entries whose file name matches a gitignore-style glob.
pub fn skip_path(pattern: &str) -> FsResult<FilterFn> {
    let mut builder = GitignoreBuilder::new("");
    builder.add_line(None, pattern)?;
    let matcher: Gitignore = builder.build()?;
    Ok(FilterFn::new("skip_path", move |entry| {
        let Some(name) = entry.path.file_name() else {
            return Ok(false);
        };
        Ok(matcher.matched(Path::new(name), entry.is_dir).is_ignore())
    }))
}

/// Returns `true` if any filter skips the entry. Filters run in order and
/// the first error aborts.
pub fn should_skip(filters: &[FilterFn], entry: &FileEntry) -> FsResult<bool> {
    for filter in filters {
        if filter.skip(entry)? {
            return Ok(true);
        }
    }
    Ok(false)
}
