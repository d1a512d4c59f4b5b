//! Error types for the backend crate.

use std::io;
use std::path::PathBuf;

use xpkg_core::ContextError;

/// Errors from a [`FileSystem`](crate::FileSystem) or a skip filter.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The path exists but is a directory.
    #[error("is a directory: {0}")]
    IsDirectory(PathBuf),

    /// Directory traversal failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// A skip pattern could not be compiled.
    #[error("invalid path pattern: {0}")]
    Pattern(#[from] ignore::Error),

    /// A skip filter rejected the walk.
    #[error("filter error on {path}: {reason}")]
    Filter { path: PathBuf, reason: String },

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Io(e) => e,
            FsError::NotFound(_) => io::Error::new(io::ErrorKind::NotFound, err),
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// Convenience alias for filesystem results.
pub type FsResult<T> = Result<T, FsError>;

/// Errors from opening a backend's stream.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The filesystem backend could not enumerate or open its files.
    #[error("filesystem backend: {0}")]
    Fs(#[from] FsError),

    /// The remote log fetch failed; passed through unchanged.
    #[error(transparent)]
    Remote(Box<dyn std::error::Error + Send + Sync>),

    /// The backend is missing required configuration.
    #[error("backend configuration error: {0}")]
    Config(String),

    /// The context was cancelled or expired during initialization.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Convenience alias for backend results.
pub type BackendResult<T> = Result<T, BackendError>;
