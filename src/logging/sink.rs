//! Output destinations for formatted record lines
//!
//! A sink is a labelled [`MakeWriter`]. Each one becomes its own `fmt` layer
//! when a logger is bound, and the layer hands every formatted line to the
//! writer in a single `write_all`, so lines from concurrent callers never
//! interleave.

use super::error::LoggingError;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

pub struct Sink {
    label: String,
    writer: BoxMakeWriter,
}

impl Sink {
    pub fn new<W>(label: impl Into<String>, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            writer: BoxMakeWriter::new(make_writer),
        }
    }

    /// Standard output.
    pub fn console() -> Self {
        Self::new("console", io::stdout)
    }

    /// Append-only file, creating missing parent directories.
    pub fn file(path: &Path) -> Result<Self, LoggingError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggingError::OpenFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(format!("file:{}", path.display()), Mutex::new(file)))
    }

    /// In-memory sink sharing its buffer with the caller.
    pub fn memory(buffer: SharedBuffer) -> Self {
        Self::new("memory", buffer)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn into_writer(self) -> BoxMakeWriter {
        self.writer
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("label", &self.label).finish()
    }
}

/// Cloneable in-memory writer; every clone appends to the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Non-empty lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_line(sink: &Sink, line: &str) {
        let mut writer = sink.writer.make_writer();
        writer.write_all(format!("{line}\n").as_bytes()).unwrap();
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let buffer = SharedBuffer::new();
        let sink = Sink::memory(buffer.clone());
        write_line(&sink, "{\"a\":1}");
        write_line(&sink, "{\"b\":2}");
        assert_eq!(buffer.contents(), "{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(buffer.lines().len(), 2);
        assert_eq!(sink.label(), "memory");

        buffer.clear();
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn test_file_sink_creates_parent_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/logs.json");

        let sink = Sink::file(&path).unwrap();
        write_line(&sink, "first");
        // Unbuffered: the line is on disk while the sink is still open.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");
        drop(sink);

        let sink = Sink::file(&path).unwrap();
        write_line(&sink, "second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
        assert!(sink.label().starts_with("file:"));
    }

    #[test]
    fn test_file_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let result = Sink::file(&blocker.join("logs.json"));
        assert!(matches!(result, Err(LoggingError::CreateDir { .. })));
    }
}
