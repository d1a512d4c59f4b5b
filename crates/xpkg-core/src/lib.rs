//! Streaming multi-document package parser.
//!
//! A package is a stream of YAML documents. Some documents describe the
//! package itself (metadata: providers, configurations, functions) and the
//! rest are the objects the package ships (content). This crate splits a
//! stream into documents, drops the ones that carry nothing, and classifies
//! every remaining document against two independent type registries.
//!
//! # Key Types
//!
//! - [`DocumentReader`] -- lazy splitter over `---` / `...` delimited streams
//! - [`TypeRegistry`] -- decode capability for one universe of kinds
//! - [`KindRegistry`] -- `(apiVersion, kind)` keyed registry backed by `serde_yaml`
//! - [`PackageParser`] -- metadata-first classifier producing a [`Package`]
//! - [`DocumentStream`] -- readable, closeable source with optional provenance
//! - [`Context`] -- cancellation and deadline signal shared with backends
//!
//! # Classification Rules
//!
//! 1. Every document is offered to the metadata registry first.
//! 2. Only a "kind not registered" answer falls through to the content registry.
//! 3. Any other failure aborts the parse; documents decoded so far are kept.
//! 4. Errors leaving the parser carry the stream's provenance annotation, if any.

pub mod blank;
pub mod context;
pub mod error;
pub mod package;
pub mod parser;
pub mod registry;
pub mod splitter;
pub mod stream;

pub use blank::is_blank_document;
pub use context::{CancelHandle, Context, ContextError};
pub use error::{DecodeError, PackageResult, ParseError, PartialParse, RegistryRole};
pub use package::{Lintable, Package};
pub use parser::{annotate, PackageParser, Parser};
pub use registry::{Decoded, DynamicObject, DynamicRegistry, KindRegistry, TypeMeta, TypeRegistry};
pub use splitter::DocumentReader;
pub use stream::{AnnotatedStream, DocumentStream, ReaderStream};
