//! Error types for the parser crate.

use std::fmt;
use std::io;

use crate::context::ContextError;
use crate::package::Package;
use crate::registry::TypeMeta;

/// Which of the two registries a decode failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistryRole {
    /// The package descriptor registry, consulted first.
    Metadata,
    /// The payload registry, consulted on fallthrough.
    Content,
}

impl fmt::Display for RegistryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// Failure reported by a [`TypeRegistry`](crate::TypeRegistry).
///
/// The classifier dispatches on the variant: only `NotRegistered` from the
/// metadata registry is recoverable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The document is well formed but its kind is unknown to the registry.
    #[error("no kind is registered for {kind}")]
    NotRegistered { kind: TypeMeta },

    /// The document could not be decoded as an object.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Any other registry failure.
    #[error("decode failed: {0}")]
    Other(String),
}

/// Errors that abort a parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Reading or splitting the stream failed.
    #[error("failed to read document stream: {0}")]
    Io(#[from] io::Error),

    /// A registry rejected a document for a reason other than an unknown kind.
    #[error("{role} registry: {source}")]
    Decode {
        role: RegistryRole,
        #[source]
        source: DecodeError,
    },

    /// Neither registry recognizes the document's kind.
    #[error("metadata registry: no kind is registered for {kind}, and it is not a known content kind")]
    Unrecognized { kind: TypeMeta },

    /// An error wrapped with the provenance of the stream it came from.
    #[error("{annotation}: {source}")]
    Annotated {
        annotation: String,
        #[source]
        source: Box<ParseError>,
    },

    /// The parse context was cancelled before reading began.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ParseError {
    /// The error with any provenance annotation removed.
    pub fn root(&self) -> &ParseError {
        match self {
            Self::Annotated { source, .. } => source.root(),
            other => other,
        }
    }

    /// The provenance annotation, if the error carries one.
    pub fn annotation(&self) -> Option<&str> {
        match self {
            Self::Annotated { annotation, .. } => Some(annotation),
            _ => None,
        }
    }
}

/// A failed parse: the error plus everything decoded before it.
///
/// Parsing is not transactional. Callers that need all-or-nothing semantics
/// discard the package themselves.
pub struct PartialParse<M, C> {
    package: Package<M, C>,
    error: ParseError,
}

impl<M, C> PartialParse<M, C> {
    pub(crate) fn new(package: Package<M, C>, error: ParseError) -> Self {
        Self { package, error }
    }

    /// The documents decoded before the failure.
    pub fn package(&self) -> &Package<M, C> {
        &self.package
    }

    /// The error that stopped the parse.
    pub fn error(&self) -> &ParseError {
        &self.error
    }

    /// Split into the partial package and the error.
    pub fn into_parts(self) -> (Package<M, C>, ParseError) {
        (self.package, self.error)
    }
}

impl<M, C> fmt::Debug for PartialParse<M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialParse")
            .field("metadata", &self.package.metadata().len())
            .field("content", &self.package.content().len())
            .field("error", &self.error)
            .finish()
    }
}

impl<M, C> fmt::Display for PartialParse<M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<M, C> std::error::Error for PartialParse<M, C> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

/// Result of a parse call: the full package, or a partial one with its error.
pub type PackageResult<M, C> = Result<Package<M, C>, PartialParse<M, C>>;
