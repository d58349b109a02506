//! # Telemetry — Injected Logging Handle
//!
//! `Telemetry` wraps a `tracing::Dispatch` built from explicit settings.
//! Components that log (archive store, collectors, runner) receive a handle
//! at construction and emit their events inside it, instead of reaching for
//! a process-global subscriber. Two stores with two handles log to two
//! places; a test can hand a component a capturing handle and assert on the
//! output without touching global state.
//!
//! ## Level Names
//!
//! Levels accept the names found in existing LUFT configuration files
//! (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`) as well as tracing's own
//! (`trace`, `warn`, `off`), case-insensitively. `RUST_LOG` overrides the
//! configured level unless the builder is told to ignore the environment.

use std::fmt;
use std::fs::OpenOptions;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::TelemetryError;

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync + 'static>;

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn layer<W>(self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        match self {
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .boxed(),
        }
    }
}

/// Map a configured level name to an `EnvFilter` directive.
pub fn level_directive(name: &str) -> Result<&'static str, TelemetryError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok("trace"),
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARN" | "WARNING" => Ok("warn"),
        "ERROR" | "CRITICAL" => Ok("error"),
        "OFF" => Ok("off"),
        _ => Err(TelemetryError::UnknownLevel(name.to_string())),
    }
}

/// A cloneable logging handle.
#[derive(Clone)]
pub struct Telemetry {
    dispatch: Dispatch,
}

impl Telemetry {
    /// Start building a handle. Defaults: `INFO`, text, stdout, honour `RUST_LOG`.
    pub fn builder() -> TelemetryBuilder {
        TelemetryBuilder::default()
    }

    /// A handle that discards everything.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Run `f` with this handle as the thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Attach this handle to a future so every poll logs through it.
    pub fn instrument<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry").finish_non_exhaustive()
    }
}

/// Builder for [`Telemetry`].
#[derive(Debug, Clone)]
pub struct TelemetryBuilder {
    level: String,
    format: LogFormat,
    stdout: bool,
    stderr: bool,
    file: Option<PathBuf>,
    capture: Option<LogCapture>,
    env_override: bool,
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: LogFormat::Text,
            stdout: true,
            stderr: false,
            file: None,
            capture: None,
            env_override: true,
        }
    }
}

impl TelemetryBuilder {
    /// Minimum level, e.g. `INFO` or `WARNING`.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Output encoding.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Whether to write to stdout.
    pub fn stdout(mut self, enabled: bool) -> Self {
        self.stdout = enabled;
        self
    }

    /// Whether to write to stderr.
    pub fn stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Also append to this file. Missing parent directories are created.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Also write into an in-memory buffer.
    pub fn capture(mut self, capture: LogCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Ignore `RUST_LOG` and use the configured level only.
    pub fn ignore_env(mut self) -> Self {
        self.env_override = false;
        self
    }

    /// Build the dispatcher.
    ///
    /// # Errors
    ///
    /// Unknown level names and unopenable log files.
    pub fn build(self) -> Result<Telemetry, TelemetryError> {
        let directive = level_directive(&self.level)?;
        let filter = if self.env_override {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
        } else {
            EnvFilter::new(directive)
        };

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if self.stdout {
            layers.push(self.format.layer(io::stdout, true));
        }
        if self.stderr {
            layers.push(self.format.layer(io::stderr, true));
        }
        if let Some(path) = &self.file {
            let file = open_log_file(path)?;
            layers.push(self.format.layer(Mutex::new(file), false));
        }
        if let Some(capture) = self.capture {
            layers.push(self.format.layer(capture, false));
        }

        let subscriber = tracing_subscriber::registry().with(filter).with(layers);
        Ok(Telemetry {
            dispatch: Dispatch::new(subscriber),
        })
    }
}

fn open_log_file(path: &Path) -> Result<std::fs::File, TelemetryError> {
    let wrap = |source| TelemetryError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)
}

/// In-memory log sink.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCapture").finish_non_exhaustive()
    }
}

/// Writer half of [`LogCapture`].
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capturing(level: &str) -> (Telemetry, LogCapture) {
        let capture = LogCapture::new();
        let telemetry = Telemetry::builder()
            .level(level)
            .stdout(false)
            .ignore_env()
            .capture(capture.clone())
            .build()
            .unwrap();
        (telemetry, capture)
    }

    #[test]
    fn level_names_map_to_directives() {
        assert_eq!(level_directive("INFO").unwrap(), "info");
        assert_eq!(level_directive("warning").unwrap(), "warn");
        assert_eq!(level_directive("CRITICAL").unwrap(), "error");
        assert_eq!(level_directive(" debug ").unwrap(), "debug");
        assert!(matches!(
            level_directive("LOUD"),
            Err(TelemetryError::UnknownLevel(_))
        ));
    }

    #[test]
    fn events_inside_scope_are_captured() {
        let (telemetry, capture) = capturing("INFO");
        telemetry.in_scope(|| tracing::info!(source = "solar_wind", "archived snapshot"));
        let out = capture.contents();
        assert!(out.contains("archived snapshot"));
        assert!(out.contains("solar_wind"));
        assert!(out.contains("INFO"));
    }

    #[test]
    fn level_filters_lower_events() {
        let (telemetry, capture) = capturing("WARNING");
        telemetry.in_scope(|| {
            tracing::info!("quiet");
            tracing::warn!("loud");
        });
        let out = capture.contents();
        assert!(!out.contains("quiet"));
        assert!(out.contains("loud"));
    }

    #[test]
    fn handles_are_independent() {
        let (first, first_out) = capturing("INFO");
        let (second, second_out) = capturing("INFO");
        first.in_scope(|| tracing::info!("to-first"));
        second.in_scope(|| tracing::info!("to-second"));
        assert!(first_out.contents().contains("to-first"));
        assert!(!first_out.contents().contains("to-second"));
        assert!(second_out.contents().contains("to-second"));
    }

    #[test]
    fn json_format_emits_objects() {
        let capture = LogCapture::new();
        let telemetry = Telemetry::builder()
            .format(LogFormat::Json)
            .stdout(false)
            .ignore_env()
            .capture(capture.clone())
            .build()
            .unwrap();
        telemetry.in_scope(|| tracing::info!(cycle = 3, "done"));
        let line = capture.contents();
        let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed["fields"]["message"], "done");
        assert_eq!(parsed["fields"]["cycle"], 3);
    }

    #[test]
    fn file_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("luft.log");
        let telemetry = Telemetry::builder()
            .stdout(false)
            .ignore_env()
            .file(&path)
            .build()
            .unwrap();
        telemetry.in_scope(|| tracing::error!("disk full"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("disk full"));
    }

    #[test]
    fn unknown_level_rejected_at_build() {
        let err = Telemetry::builder().level("chatty").build().unwrap_err();
        assert!(matches!(err, TelemetryError::UnknownLevel(ref l) if l == "chatty"));
    }

    #[test]
    fn disabled_handle_swallows_events() {
        Telemetry::disabled().in_scope(|| tracing::error!("nobody hears this"));
    }

    #[tokio::test]
    async fn instrumented_future_logs_through_handle() {
        let (telemetry, capture) = capturing("INFO");
        telemetry
            .instrument(async {
                tokio::task::yield_now().await;
                tracing::info!("after await");
            })
            .await;
        assert!(capture.contents().contains("after await"));
    }
}
