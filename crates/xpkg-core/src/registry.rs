//! Type registries: the decode capability the parser classifies against.
//!
//! A registry answers one question for a document: "is this one of my kinds,
//! and if so, what object is it?" The parser holds two of them and never
//! looks inside; see [`TypeRegistry`] for the contract.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::trace;

use crate::error::DecodeError;

/// The `apiVersion` / `kind` pair identifying a document's type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeMeta {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    /// The API group; empty for the core group (`apiVersion: v1`).
    pub fn group(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map(|(group, _)| group)
            .unwrap_or("")
    }

    /// The API version without its group.
    pub fn version(&self) -> &str {
        self.api_version
            .rsplit_once('/')
            .map(|(_, version)| version)
            .unwrap_or(&self.api_version)
    }

    /// Read the type of an already-parsed document.
    ///
    /// A missing `apiVersion` reads as empty; a missing or empty `kind` is
    /// malformed.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        if !value.is_mapping() {
            return Err(DecodeError::Malformed(
                "document is not a mapping".to_string(),
            ));
        }
        let api_version = match value.get("apiVersion") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(DecodeError::Malformed(
                    "'apiVersion' must be a string".to_string(),
                ))
            }
        };
        let kind = match value.get("kind") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(DecodeError::Malformed("object 'kind' is missing".to_string()))
            }
            Some(_) => {
                return Err(DecodeError::Malformed("'kind' must be a string".to_string()))
            }
        };
        Ok(Self { api_version, kind })
    }
}

impl fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.api_version.is_empty() {
            write!(f, "Kind={}", self.kind)
        } else {
            write!(f, "{}, Kind={}", self.api_version, self.kind)
        }
    }
}

/// A successfully decoded document.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub object: T,
    /// The type the registry discovered for the document.
    pub type_meta: TypeMeta,
}

/// Decode capability for one universe of kinds.
///
/// Implementations must be safe for concurrent read-only use: the same
/// registry is shared by every parse in the process.
///
/// Return [`DecodeError::NotRegistered`] only when the document is well formed
/// but its kind is not one of yours. The parser treats that answer, and only
/// that answer, as "try the other registry".
pub trait TypeRegistry: Send + Sync {
    type Object;

    /// Decode one document.
    fn decode(&self, document: &[u8]) -> Result<Decoded<Self::Object>, DecodeError>;
}

type Constructor<T> = Box<dyn Fn(Value) -> Result<T, String> + Send + Sync>;

/// A registry keyed by `(apiVersion, kind)`.
///
/// Documents are parsed with `serde_yaml`, their type is looked up, and the
/// registered constructor builds the object.
pub struct KindRegistry<T> {
    name: String,
    kinds: HashMap<TypeMeta, Constructor<T>>,
}

impl<T> KindRegistry<T> {
    /// Create an empty registry. The name tags its log events.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kinds: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a kind with a constructor over the raw document value.
    ///
    /// Registering the same type twice replaces the earlier constructor.
    pub fn register<F>(&mut self, type_meta: TypeMeta, constructor: F) -> &mut Self
    where
        F: Fn(Value) -> Result<T, String> + Send + Sync + 'static,
    {
        self.kinds.insert(type_meta, Box::new(constructor));
        self
    }

    /// Register a kind that deserializes into `D` and is wrapped into `T`.
    pub fn register_typed<D, W>(&mut self, type_meta: TypeMeta, wrap: W) -> &mut Self
    where
        T: 'static,
        D: DeserializeOwned + 'static,
        W: Fn(D) -> T + Send + Sync + 'static,
    {
        self.register(type_meta, move |value| {
            serde_yaml::from_value::<D>(value)
                .map(&wrap)
                .map_err(|e| e.to_string())
        })
    }

    /// All registered types, sorted.
    pub fn kinds(&self) -> Vec<&TypeMeta> {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl KindRegistry<DynamicObject> {
    /// Register a kind decoded into a [`DynamicObject`].
    pub fn register_dynamic(&mut self, type_meta: TypeMeta) -> &mut Self {
        self.register(type_meta, DynamicObject::from_value)
    }
}

impl<T> fmt::Debug for KindRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRegistry")
            .field("name", &self.name)
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl<T> TypeRegistry for KindRegistry<T> {
    type Object = T;

    fn decode(&self, document: &[u8]) -> Result<Decoded<T>, DecodeError> {
        let value: Value = serde_yaml::from_slice(document)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let type_meta = TypeMeta::from_value(&value)?;
        let Some(constructor) = self.kinds.get(&type_meta) else {
            trace!(registry = %self.name, kind = %type_meta, "kind not registered");
            return Err(DecodeError::NotRegistered { kind: type_meta });
        };
        let object = constructor(value)
            .map_err(|reason| DecodeError::Malformed(format!("{type_meta}: {reason}")))?;
        Ok(Decoded { object, type_meta })
    }
}

/// An untyped object: its type, identity, and the full document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DynamicObject {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub name: Option<String>,
    pub namespace: Option<String>,
    #[serde(skip)]
    pub data: Value,
}

impl DynamicObject {
    /// Build from a parsed document. Fails if the document has no kind.
    pub fn from_value(data: Value) -> Result<Self, String> {
        let type_meta = TypeMeta::from_value(&data).map_err(|e| e.to_string())?;
        let metadata_field = |field: &str| {
            data.get("metadata")
                .and_then(|m| m.get(field))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let name = metadata_field("name");
        let namespace = metadata_field("namespace");
        Ok(Self {
            type_meta,
            name,
            namespace,
            data,
        })
    }

    pub fn kind(&self) -> &str {
        &self.type_meta.kind
    }
}

/// A registry that recognizes every well-formed document.
///
/// Useful as a content registry when the package may ship arbitrary kinds.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamicRegistry;

impl TypeRegistry for DynamicRegistry {
    type Object = DynamicObject;

    fn decode(&self, document: &[u8]) -> Result<Decoded<DynamicObject>, DecodeError> {
        let value: Value = serde_yaml::from_slice(document)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let type_meta = TypeMeta::from_value(&value)?;
        let object = DynamicObject::from_value(value).map_err(DecodeError::Malformed)?;
        Ok(Decoded { object, type_meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Provider {
        metadata: ProviderMeta,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ProviderMeta {
        name: String,
    }

    fn provider_type() -> TypeMeta {
        TypeMeta::new("meta.pkg.xpkg.dev/v1", "Provider")
    }

    #[test]
    fn group_and_version() {
        let tm = provider_type();
        assert_eq!(tm.group(), "meta.pkg.xpkg.dev");
        assert_eq!(tm.version(), "v1");

        let core = TypeMeta::new("v1", "ConfigMap");
        assert_eq!(core.group(), "");
        assert_eq!(core.version(), "v1");
        assert_eq!(core.to_string(), "v1, Kind=ConfigMap");

        let bare = TypeMeta::new("", "Foo");
        assert_eq!(bare.group(), "");
        assert_eq!(bare.to_string(), "Kind=Foo");
    }

    #[test]
    fn decodes_registered_kind() {
        let mut registry: KindRegistry<String> = KindRegistry::new("meta");
        registry.register_typed(provider_type(), |p: Provider| p.metadata.name);

        let doc = b"apiVersion: meta.pkg.xpkg.dev/v1\nkind: Provider\nmetadata:\n  name: provider-aws\n";
        let decoded = registry.decode(doc).unwrap();
        assert_eq!(decoded.object, "provider-aws");
        assert_eq!(decoded.type_meta, provider_type());
    }

    #[test]
    fn unknown_kind_is_not_registered() {
        let registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        let err = registry.decode(b"apiVersion: v1\nkind: ConfigMap\n").unwrap_err();
        assert_eq!(
            err,
            DecodeError::NotRegistered {
                kind: TypeMeta::new("v1", "ConfigMap")
            }
        );
    }

    #[test]
    fn same_kind_other_version_is_not_registered() {
        let mut registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        registry.register_dynamic(provider_type());
        let err = registry
            .decode(b"apiVersion: meta.pkg.xpkg.dev/v1beta1\nkind: Provider\n")
            .unwrap_err();
        assert!(matches!(err, DecodeError::NotRegistered { .. }));
    }

    #[test]
    fn missing_kind_is_malformed() {
        let registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        let err = registry.decode(b"apiVersion: v1\nmetadata: {}\n").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn scalar_document_is_malformed() {
        let registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        assert!(matches!(
            registry.decode(b"just a string\n").unwrap_err(),
            DecodeError::Malformed(_)
        ));
    }

    #[test]
    fn invalid_yaml_is_malformed() {
        let registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        assert!(matches!(
            registry.decode(b"kind: [unclosed\n").unwrap_err(),
            DecodeError::Malformed(_)
        ));
    }

    #[test]
    fn constructor_failure_is_malformed() {
        let mut registry: KindRegistry<String> = KindRegistry::new("meta");
        registry.register_typed(provider_type(), |p: Provider| p.metadata.name);
        let err = registry
            .decode(b"apiVersion: meta.pkg.xpkg.dev/v1\nkind: Provider\nmetadata: 3\n")
            .unwrap_err();
        match err {
            DecodeError::Malformed(reason) => assert!(reason.starts_with("meta.pkg.xpkg.dev/v1, Kind=Provider")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_api_version_reads_as_empty() {
        let mut registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        registry.register_dynamic(TypeMeta::new("", "Foo"));
        let decoded = registry.decode(b"kind: Foo\n").unwrap();
        assert_eq!(decoded.object.kind(), "Foo");
        assert_eq!(decoded.type_meta.api_version, "");
    }

    #[test]
    fn dynamic_object_reads_identity() {
        let obj = DynamicRegistry
            .decode(b"apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n  namespace: system\n")
            .unwrap()
            .object;
        assert_eq!(obj.name.as_deref(), Some("cfg"));
        assert_eq!(obj.namespace.as_deref(), Some("system"));
        assert_eq!(obj.kind(), "ConfigMap");
    }

    #[test]
    fn kinds_are_sorted() {
        let mut registry: KindRegistry<DynamicObject> = KindRegistry::new("meta");
        registry
            .register_dynamic(TypeMeta::new("meta.pkg.xpkg.dev/v1", "Provider"))
            .register_dynamic(TypeMeta::new("meta.pkg.xpkg.dev/v1", "Configuration"));
        let kinds: Vec<_> = registry.kinds().into_iter().map(|k| k.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Configuration", "Provider"]);
        assert_eq!(registry.len(), 2);
    }
}
