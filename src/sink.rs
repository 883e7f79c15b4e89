use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Externally owned destination for serialized log lines.
///
/// A `stream` target calls `write` exactly once per accepted record with
/// the JSON text followed by `\n`. The same stream may be shared by a
/// logger and all of its children, so implementations take `&self` and
/// handle their own synchronization.
pub trait LogStream: Send + Sync {
    /// Write one chunk of text.
    ///
    /// **Returns**
    /// - `Ok(())` once the chunk was accepted.
    /// - `Err(..)` if the underlying writer failed. The logger does not
    ///   retry; the error reaches the caller of the logging method.
    fn write(&self, chunk: &str) -> io::Result<()>;
}

/// Reference-counted stream as stored in target configurations.
pub type SharedStream = Arc<dyn LogStream>;

/// Adapts any [`io::Write`] (a file, stderr, a socket) into a [`LogStream`].
pub struct WriterStream<W> {
    inner: Mutex<W>,
}

impl<W: Write + Send> WriterStream<W> {
    pub fn new(writer: W) -> Self {
        WriterStream {
            inner: Mutex::new(writer),
        }
    }

    /// Take the writer back, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogStream for WriterStream<W> {
    fn write(&self, chunk: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(chunk.as_bytes())?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_stream_passes_chunks_through() {
        let stream = WriterStream::new(Vec::new());
        stream.write("{\"a\":1}\n").unwrap();
        stream.write("{\"b\":2}\n").unwrap();
        assert_eq!(
            String::from_utf8(stream.into_inner()).unwrap(),
            "{\"a\":1}\n{\"b\":2}\n"
        );
    }
}
