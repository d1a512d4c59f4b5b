//! The package parser: split, skip blanks, classify.

use std::io::BufReader;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::blank::is_blank_document;
use crate::context::Context;
use crate::error::{DecodeError, PackageResult, ParseError, PartialParse, RegistryRole};
use crate::package::Package;
use crate::registry::{Decoded, TypeRegistry};
use crate::splitter::DocumentReader;
use crate::stream::{DocumentStream, StreamGuard};

/// Parses a document stream into a package.
pub trait Parser {
    type Metadata;
    type Content;

    /// Parse every document in `stream`.
    ///
    /// `None` means there is no input and yields an empty package. The stream
    /// is closed before this returns, whatever the outcome.
    fn parse(
        &self,
        ctx: &Context,
        stream: Option<Box<dyn DocumentStream>>,
    ) -> PackageResult<Self::Metadata, Self::Content>;
}

/// Where a document ended up.
enum Classified<M, C> {
    Metadata(Decoded<M>),
    Content(Decoded<C>),
}

/// Classifies documents against a metadata registry first and a content
/// registry second.
///
/// Only [`DecodeError::NotRegistered`] from the metadata registry falls
/// through to the content registry. A malformed metadata document is an error
/// even if the content registry would have accepted it; masking it as content
/// would hide schema mistakes in package descriptors.
pub struct PackageParser<M, C> {
    metadata: Arc<M>,
    content: Arc<C>,
}

impl<M, C> Clone for PackageParser<M, C> {
    fn clone(&self) -> Self {
        Self {
            metadata: Arc::clone(&self.metadata),
            content: Arc::clone(&self.content),
        }
    }
}

impl<M: TypeRegistry, C: TypeRegistry> PackageParser<M, C> {
    pub fn new(metadata: Arc<M>, content: Arc<C>) -> Self {
        Self { metadata, content }
    }

    fn classify(&self, document: &[u8]) -> Result<Classified<M::Object, C::Object>, ParseError> {
        match self.metadata.decode(document) {
            Ok(decoded) => Ok(Classified::Metadata(decoded)),
            Err(DecodeError::NotRegistered { kind }) => match self.content.decode(document) {
                Ok(decoded) => Ok(Classified::Content(decoded)),
                Err(DecodeError::NotRegistered { .. }) => Err(ParseError::Unrecognized { kind }),
                Err(source) => Err(ParseError::Decode {
                    role: RegistryRole::Content,
                    source,
                }),
            },
            Err(source) => Err(ParseError::Decode {
                role: RegistryRole::Metadata,
                source,
            }),
        }
    }

    fn parse_into(
        &self,
        stream: &mut StreamGuard,
        pkg: &mut Package<M::Object, C::Object>,
    ) -> Result<(), ParseError> {
        let mut documents = DocumentReader::new(BufReader::new(&mut *stream));
        let mut index = 0usize;

        while let Some(document) = documents.next() {
            let document = document?;
            index += 1;
            if is_blank_document(&document) {
                trace!(index, "skipping blank document");
                continue;
            }

            match self.classify(&document) {
                Ok(Classified::Metadata(decoded)) => {
                    debug!(index, kind = %decoded.type_meta, "decoded metadata document");
                    pkg.push_metadata(decoded.object);
                }
                Ok(Classified::Content(decoded)) => {
                    debug!(index, kind = %decoded.type_meta, "decoded content document");
                    pkg.push_content(decoded.object);
                }
                Err(err) => {
                    debug!(index, error = %err, "document rejected");
                    return Err(annotate(err, documents.get_ref().get_ref().annotation()));
                }
            }
        }
        Ok(())
    }
}

impl<M: TypeRegistry, C: TypeRegistry> Parser for PackageParser<M, C> {
    type Metadata = M::Object;
    type Content = C::Object;

    fn parse(
        &self,
        ctx: &Context,
        stream: Option<Box<dyn DocumentStream>>,
    ) -> PackageResult<M::Object, C::Object> {
        let mut pkg = Package::new();
        let Some(stream) = stream else {
            return Ok(pkg);
        };
        let mut stream = StreamGuard::new(stream);

        if let Some(err) = ctx.err() {
            return Err(PartialParse::new(pkg, err.into()));
        }

        match self.parse_into(&mut stream, &mut pkg) {
            Ok(()) => {
                debug!(
                    metadata = pkg.metadata().len(),
                    content = pkg.content().len(),
                    "parsed package"
                );
                Ok(pkg)
            }
            Err(err) => Err(PartialParse::new(pkg, err)),
        }
    }
}

/// Wrap `err` with the stream's provenance annotation, if there is one.
pub fn annotate(err: ParseError, annotation: Option<String>) -> ParseError {
    match annotation {
        Some(annotation) => ParseError::Annotated {
            annotation,
            source: Box::new(err),
        },
        None => err,
    }
}
