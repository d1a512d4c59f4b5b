//! Pod log backend: streams a container's logs from a cluster.

use std::error::Error;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use xpkg_core::{AnnotatedStream, Context, DocumentStream};

use crate::backend::Backend;
use crate::error::{BackendError, BackendResult};
use crate::option::BackendOption;

/// The slice of a cluster API the pod log backend needs.
#[async_trait]
pub trait LogClient: Send + Sync {
    /// Open the log stream of pod `name` in `namespace`.
    async fn stream_logs(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Box<dyn Read + Send>, Box<dyn Error + Send + Sync>>;
}

/// Reads package documents from a pod's log output.
///
/// Both a client and a pod name must be set before [`Backend::init`]. An
/// unset namespace means `default`.
#[derive(Clone, Default)]
pub struct PodLogBackend {
    client: Option<Arc<dyn LogClient>>,
    name: String,
    namespace: String,
}

impl PodLogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &[BackendOption]) -> Self {
        let mut backend = Self::new();
        backend.apply_all(options);
        backend
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        if self.namespace.is_empty() {
            "default"
        } else {
            &self.namespace
        }
    }
}

impl fmt::Debug for PodLogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodLogBackend")
            .field("client", &self.client.as_ref().map(|_| "LogClient"))
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[async_trait]
impl Backend for PodLogBackend {
    fn apply(&mut self, option: &BackendOption) {
        match option {
            BackendOption::PodClient(client) => self.client = Some(Arc::clone(client)),
            BackendOption::PodName(name) => self.name = name.clone(),
            BackendOption::PodNamespace(namespace) => self.namespace = namespace.clone(),
            _ => {}
        }
    }

    async fn init(
        &mut self,
        ctx: &Context,
        options: &[BackendOption],
    ) -> BackendResult<Box<dyn DocumentStream>> {
        self.apply_all(options);

        let client = self
            .client
            .clone()
            .ok_or_else(|| BackendError::Config("pod log backend has no client".into()))?;
        if self.name.is_empty() {
            return Err(BackendError::Config("pod log backend has no pod name".into()));
        }
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }

        let namespace = self.namespace().to_string();
        debug!(namespace = %namespace, pod = %self.name, "opening pod log stream");
        let logs = tokio::select! {
            err = ctx.done() => return Err(err.into()),
            logs = client.stream_logs(&namespace, &self.name) => logs.map_err(BackendError::Remote)?,
        };

        Ok(AnnotatedStream::new(logs, format!("pod {}/{}", namespace, self.name)).boxed())
    }
}
