use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

static LOG_FILE: OnceLock<Arc<Mutex<File>>> = OnceLock::new();

/// Routes subscriber output to the log file when one was configured. The
/// terminal belongs to the renderer, so without a file output is dropped.
pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<Mutex<File>>),
    Sink(io::Sink),
}

impl DelegatingWriter {
    fn new() -> Self {
        match LOG_FILE.get() {
            Some(file) => DelegatingWriter {
                inner: DelegatingInner::File(Arc::clone(file)),
            },
            None => DelegatingWriter {
                inner: DelegatingInner::Sink(io::sink()),
            },
        }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(file) => match file.lock() {
                Ok(mut guard) => guard.write(buf),
                // A panic mid-write poisons the lock; the entry is lost.
                Err(_) => Ok(buf.len()),
            },
            DelegatingInner::Sink(sink) => sink.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(file) => match file.lock() {
                Ok(mut guard) => guard.flush(),
                Err(_) => Ok(()),
            },
            DelegatingInner::Sink(sink) => sink.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Parses `error`, `warn`, `info`, `debug` or `trace`, case-insensitively.
pub fn parse_level(value: &str) -> Option<Level> {
    value.trim().parse().ok()
}

/// Installs the global subscriber, appending to `log_file` when given.
///
/// Safe to call multiple times; only the first log file and subscriber are
/// kept.
pub fn init(log_file: Option<&Path>, level: Level) -> io::Result<()> {
    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let _ = LOG_FILE.set(Arc::new(Mutex::new(file)));
    }
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(SubscriberMakeWriter)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .compact()
        .try_init();
    Ok(())
}

/// Debug-level subscriber with no log file.
pub fn init_default() {
    let _ = init(None, Level::DEBUG);
}
