//! The parse result: metadata and content objects in stream order.

/// Read access to a parsed package, for linters and validators.
pub trait Lintable {
    type Meta;
    type Object;

    /// Package descriptors, e.g. Provider, Configuration, or Function.
    fn meta(&self) -> &[Self::Meta];

    /// Everything else the package ships.
    fn objects(&self) -> &[Self::Object];
}

/// The documents of one parse, split by the registry that recognized them.
///
/// Both sequences preserve stream order. Downstream consumers treat the first
/// metadata object as the package's primary descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Package<M, C> {
    metadata: Vec<M>,
    content: Vec<C>,
}

impl<M, C> Package<M, C> {
    /// An empty package.
    pub fn new() -> Self {
        Self {
            metadata: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Objects recognized by the metadata registry.
    pub fn metadata(&self) -> &[M] {
        &self.metadata
    }

    /// Objects recognized by the content registry.
    pub fn content(&self) -> &[C] {
        &self.content
    }

    /// The first metadata object, if any.
    pub fn primary(&self) -> Option<&M> {
        self.metadata.first()
    }

    /// Total number of decoded documents.
    pub fn len(&self) -> usize {
        self.metadata.len() + self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.content.is_empty()
    }

    pub fn into_parts(self) -> (Vec<M>, Vec<C>) {
        (self.metadata, self.content)
    }

    pub(crate) fn push_metadata(&mut self, object: M) {
        self.metadata.push(object);
    }

    pub(crate) fn push_content(&mut self, object: C) {
        self.content.push(object);
    }
}

impl<M, C> Default for Package<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, C> Lintable for Package<M, C> {
    type Meta = M;
    type Object = C;

    fn meta(&self) -> &[M] {
        self.metadata()
    }

    fn objects(&self) -> &[C] {
        self.content()
    }
}
