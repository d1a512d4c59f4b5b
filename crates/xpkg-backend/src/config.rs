//! Declarative backend selection, loadable from TOML.
//!
//! ```toml
//! type = "fs"
//! dir = "package"
//! skip_paths = [".up", "*.test.yaml"]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, EchoBackend, FsBackend, NopBackend};
use crate::error::{BackendError, BackendResult, FsResult};
use crate::filter::{skip_dirs, skip_empty, skip_not_yaml, skip_path, FilterFn};
use crate::fs::{FileSystem, OsFs};
use crate::option::BackendOption;

/// Which backend to build and how to configure it.
///
/// The pod log backend is absent: it needs a live cluster client, which
/// cannot come from a file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    Fs(FsConfig),
    Echo { content: String },
    #[default]
    Nop,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub dir: PathBuf,
    pub skip_dirs: bool,
    pub skip_empty: bool,
    pub yaml_only: bool,
    /// Gitignore-style globs matched against file names.
    pub skip_paths: Vec<String>,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            skip_dirs: true,
            skip_empty: false,
            yaml_only: true,
            skip_paths: Vec::new(),
        }
    }
}

impl FsConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// The filter list these settings describe.
    pub fn filters(&self) -> FsResult<Vec<FilterFn>> {
        let mut filters = Vec::new();
        if self.skip_dirs {
            filters.push(skip_dirs());
        }
        if self.skip_empty {
            filters.push(skip_empty());
        }
        if self.yaml_only {
            filters.push(skip_not_yaml());
        }
        for pattern in &self.skip_paths {
            filters.push(skip_path(pattern)?);
        }
        Ok(filters)
    }

    /// The options that configure an [`FsBackend`] this way.
    pub fn options(&self) -> FsResult<Vec<BackendOption>> {
        Ok(vec![
            BackendOption::FsDir(self.dir.clone()),
            BackendOption::FsFilters(self.filters()?),
        ])
    }
}

impl BackendConfig {
    pub fn from_toml_str(s: &str) -> BackendResult<Self> {
        toml::from_str(s).map_err(|e| BackendError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> BackendResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BackendError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> BackendResult<String> {
        toml::to_string(self).map_err(|e| BackendError::Config(e.to_string()))
    }

    /// Build the configured backend over the host filesystem.
    pub fn build(&self) -> BackendResult<Box<dyn Backend>> {
        self.build_with_fs(Arc::new(OsFs))
    }

    /// Build the configured backend, reading files from `fs`.
    pub fn build_with_fs(&self, fs: Arc<dyn FileSystem>) -> BackendResult<Box<dyn Backend>> {
        Ok(match self {
            Self::Fs(config) => Box::new(FsBackend::with_options(fs, &config.options()?)),
            Self::Echo { content } => Box::new(EchoBackend::new(content.clone())),
            Self::Nop => Box::new(NopBackend),
        })
    }
}
