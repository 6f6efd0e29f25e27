//! Shared logging setup for csvgate binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "csvgate=info,csvgate_detect=info";
const VERBOSE_LOG_FILTER: &str = "csvgate=debug,csvgate_detect=debug";
const QUIET_LOG_FILTER: &str = "warn";
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration shared by csvgate binaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Debug output on stderr.
    pub verbose: bool,
    /// Only warnings on stderr, used when stdout carries JSON.
    pub quiet: bool,
    /// Also append plain-text logs here.
    pub log_file: Option<&'a Path>,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides every filter. Fails if a subscriber is already set.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().ok();

    let console_filter = match &env_filter {
        Some(filter) => filter.clone(),
        None => EnvFilter::new(console_directives(&config)),
    };

    let file_layer = match config.log_file {
        Some(path) => {
            let writer = SharedFileWriter::open(path, MAX_LOG_FILE_SIZE)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let file_filter = env_filter
                .clone()
                .unwrap_or_else(|| EnvFilter::new(file_directives(&config)));
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.verbose)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(app = config.app_name, "Logging initialized");
    Ok(())
}

/// Filter directives for stderr when `RUST_LOG` is unset.
pub fn console_directives(config: &LogConfig<'_>) -> &'static str {
    if config.verbose {
        VERBOSE_LOG_FILTER
    } else if config.quiet {
        QUIET_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Filter directives for the log file when `RUST_LOG` is unset. The file
/// keeps info-level events even in quiet mode.
pub fn file_directives(config: &LogConfig<'_>) -> &'static str {
    if config.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Append-only log file. When it grows past `max_size` the current file is
/// moved to `<name>.1` and a fresh one is started.
struct SizeCappedFile {
    path: PathBuf,
    max_size: u64,
    file: File,
    size: u64,
}

impl SizeCappedFile {
    fn open(path: &Path, max_size: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_size,
            file,
            size,
        })
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.backup_path())?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for SizeCappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    inner: Arc<Mutex<SizeCappedFile>>,
}

impl SharedFileWriter {
    fn open(path: &Path, max_size: u64) -> io::Result<Self> {
        Ok(Self {
            inner: Arc::new(Mutex::new(SizeCappedFile::open(path, max_size)?)),
        })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .flush()
    }
}
