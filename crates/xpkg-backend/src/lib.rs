//! Input backends for the xpkg parser.
//!
//! A backend turns some configured source into one
//! [`DocumentStream`](xpkg_core::DocumentStream): a directory of YAML files,
//! a pod's log output, a literal string, or nothing at all. All backends
//! share the [`BackendOption`] vocabulary and ignore options meant for
//! another backend.

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod fs;
pub mod option;
pub mod podlog;
pub mod reader;

pub use backend::{Backend, EchoBackend, FsBackend, NopBackend};
pub use config::{BackendConfig, FsConfig};
pub use error::{BackendError, BackendResult, FsError, FsResult};
pub use filter::{should_skip, skip_dirs, skip_empty, skip_not_yaml, skip_path, FilterFn};
pub use fs::{FileEntry, FileSystem, MemFs, OsFs};
pub use option::BackendOption;
pub use podlog::{LogClient, PodLogBackend};
pub use reader::{FsReader, FsReaderAnnotation};
