//! Options accepted by every backend.
//!
//! Options form one vocabulary shared by all backends. A backend applies the
//! variants it understands and silently ignores the rest, so one option list
//! can be handed to whichever backend a caller picked.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::filter::FilterFn;
use crate::podlog::LogClient;

#[derive(Clone)]
pub enum BackendOption {
    /// Root directory for the filesystem backend.
    FsDir(PathBuf),
    /// Replaces the filesystem backend's filter list.
    FsFilters(Vec<FilterFn>),
    /// Pod name for the pod log backend.
    PodName(String),
    /// Pod namespace for the pod log backend.
    PodNamespace(String),
    /// Cluster client for the pod log backend.
    PodClient(Arc<dyn LogClient>),
}

impl BackendOption {
    pub fn fs_dir(dir: impl Into<PathBuf>) -> Self {
        Self::FsDir(dir.into())
    }

    pub fn fs_filters(filters: impl IntoIterator<Item = FilterFn>) -> Self {
        Self::FsFilters(filters.into_iter().collect())
    }

    pub fn pod_name(name: impl Into<String>) -> Self {
        Self::PodName(name.into())
    }

    pub fn pod_namespace(namespace: impl Into<String>) -> Self {
        Self::PodNamespace(namespace.into())
    }
}

impl fmt::Debug for BackendOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FsDir(dir) => f.debug_tuple("FsDir").field(dir).finish(),
            Self::FsFilters(filters) => f.debug_tuple("FsFilters").field(filters).finish(),
            Self::PodName(name) => f.debug_tuple("PodName").field(name).finish(),
            Self::PodNamespace(ns) => f.debug_tuple("PodNamespace").field(ns).finish(),
            Self::PodClient(_) => f.write_str("PodClient(..)"),
        }
    }
}
