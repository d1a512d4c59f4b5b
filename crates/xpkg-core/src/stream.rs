//! Readable, closeable document sources.
//!
//! A [`DocumentStream`] is what a backend hands to the parser. Beyond plain
//! reading it may describe where its bytes came from; the parser uses that
//! annotation only to prefix error messages.

use std::fmt;
use std::io::{self, Read};

use tracing::warn;

/// A byte source for the parser.
///
/// `close` is called exactly once by the parser when it is done with the
/// stream, on every exit path. Dropping a stream without closing it must
/// still release its resources.
pub trait DocumentStream: Read + Send {
    /// Describe the current read position, e.g. which file is being read.
    fn annotation(&self) -> Option<String> {
        None
    }

    /// Release the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn DocumentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStream")
            .field("annotation", &self.annotation())
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStream + ?Sized> DocumentStream for Box<S> {
    fn annotation(&self) -> Option<String> {
        (**self).annotation()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts any reader into a stream without provenance.
pub struct ReaderStream<R> {
    inner: R,
}

impl<R: Read + Send> ReaderStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Box the stream for handing to the parser.
    pub fn boxed(self) -> Box<dyn DocumentStream>
    where
        R: 'static,
    {
        Box::new(self)
    }
}

impl<R> fmt::Debug for ReaderStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderStream").finish_non_exhaustive()
    }
}

impl<R: Read> Read for ReaderStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> DocumentStream for ReaderStream<R> {}

/// A reader carrying a fixed provenance annotation.
pub struct AnnotatedStream<R> {
    inner: R,
    annotation: String,
}

impl<R: Read + Send> AnnotatedStream<R> {
    pub fn new(inner: R, annotation: impl Into<String>) -> Self {
        Self {
            inner,
            annotation: annotation.into(),
        }
    }

    /// Box the stream for handing to the parser.
    pub fn boxed(self) -> Box<dyn DocumentStream>
    where
        R: 'static,
    {
        Box::new(self)
    }
}

impl<R> fmt::Debug for AnnotatedStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedStream")
            .field("annotation", &self.annotation)
            .finish_non_exhaustive()
    }
}

impl<R: Read> Read for AnnotatedStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Send> DocumentStream for AnnotatedStream<R> {
    fn annotation(&self) -> Option<String> {
        Some(self.annotation.clone())
    }
}

/// Owns a stream for the duration of a parse and closes it on drop.
pub(crate) struct StreamGuard {
    stream: Box<dyn DocumentStream>,
}

impl StreamGuard {
    pub(crate) fn new(stream: Box<dyn DocumentStream>) -> Self {
        Self { stream }
    }

    pub(crate) fn annotation(&self) -> Option<String> {
        self.stream.annotation()
    }
}

impl Read for StreamGuard {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Err(e) = self.stream.close() {
            warn!(error = %e, "failed to close document stream");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct CountingClose {
        closes: Arc<AtomicUsize>,
    }

    impl Read for CountingClose {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl DocumentStream for CountingClose {
        fn close(&mut self) -> io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::Other, "already closed"))
        }
    }

    #[test]
    fn reader_stream_has_no_annotation() {
        let mut stream = ReaderStream::new(Cursor::new(b"kind: Foo\n".to_vec()));
        assert!(stream.annotation().is_none());
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "kind: Foo\n");
        assert!(stream.close().is_ok());
    }

    #[test]
    fn annotated_stream_reports_annotation() {
        let stream = AnnotatedStream::new(io::empty(), "pod default/installer").boxed();
        assert_eq!(stream.annotation().as_deref(), Some("pod default/installer"));
    }

    #[test]
    fn boxed_stream_debug_shows_annotation() {
        let annotated = AnnotatedStream::new(io::empty(), "file a.yaml at byte 3").boxed();
        assert_eq!(
            format!("{annotated:?}"),
            r#"DocumentStream { annotation: Some("file a.yaml at byte 3"), .. }"#
        );
        let plain = ReaderStream::new(io::empty()).boxed();
        assert_eq!(format!("{plain:?}"), "DocumentStream { annotation: None, .. }");
    }

    #[test]
    fn guard_closes_once_and_swallows_close_error() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let mut guard = StreamGuard::new(Box::new(CountingClose {
                closes: Arc::clone(&closes),
            }));
            let mut buf = [0u8; 4];
            assert_eq!(guard.read(&mut buf).unwrap(), 0);
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
