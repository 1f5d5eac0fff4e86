use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Trace log writer that creates its file on the first write
///
/// A file deleted while the probe runs is recreated on the next write.
#[derive(Debug, Clone)]
pub(super) struct LazyFileWriter {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl LazyFileWriter {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Arc::new(Mutex::new(None)),
        }
    }
}

/// Per-event writer sharing the lazily opened handle
#[derive(Debug)]
pub(super) struct LazyWriter {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl LazyWriter {
    fn lock(&self) -> io::Result<MutexGuard<'_, Option<File>>> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("trace log mutex poisoned"))
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
    }
}

impl Write for LazyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.lock()?;

        if guard.is_none() || !self.path.exists() {
            *guard = Some(self.open()?);
        }

        if let Some(file) = guard.as_mut()
            && let Ok(written) = file.write(buf)
        {
            return Ok(written);
        }

        // stale handle
        let mut file = self.open()?;
        let written = file.write(buf)?;
        *guard = Some(file);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self.lock()?;

        if !self.path.exists() {
            *guard = None;
            return Ok(());
        }

        if let Some(file) = guard.as_mut()
            && file.flush().is_err()
        {
            *guard = Some(self.open()?);
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LazyFileWriter {
    type Writer = LazyWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LazyWriter {
            path: self.path.clone(),
            file: Arc::clone(&self.file),
        }
    }
}
