//! Rendering backend bridge
//!
//! The backend is a long-lived side process that turns figure JSON into
//! raster images. One line of JSON goes out on its stdin, one line with the
//! result comes back on its stdout. The bridge enforces singleton discipline,
//! health-checks the process before every submission, and bounds each
//! round-trip with a timeout.

use crate::error::{RenderError, Result};
use crate::figure::ImageFormat;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Restart budget before the bridge fails permanently
const MAX_RETRIES: u32 = 30;

/// Default bound on one render round-trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

static GLOBAL: OnceCell<Arc<Backend>> = OnceCell::new();

/// One unit of work for the renderer, serialized as a single JSON line
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    pub json_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl RenderRequest {
    /// Request a rasterized (or SVG) export of a figure
    pub fn image(json_data: Value, format: ImageFormat, scale: f64) -> Self {
        Self {
            json_data,
            html: None,
            title: None,
            format: Some(format),
            scale: Some(scale),
        }
    }

    /// Request an interactive window backed by an HTML template
    pub fn window(json_data: Value, html: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            json_data,
            html: Some(html.into()),
            title: Some(title.into()),
            format: None,
            scale: None,
        }
    }
}

/// What came back from the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// Base64-encoded raster bytes
    Raster(String),
    /// Final SVG document text
    Svg(String),
}

impl RenderResult {
    /// The payload string regardless of variant
    pub fn into_payload(self) -> String {
        match self {
            Self::Raster(s) | Self::Svg(s) => s,
        }
    }
}

/// Line-oriented transport to the renderer process
#[async_trait]
pub trait RenderTransport: Send + Sync {
    /// Spawn or respawn the renderer
    async fn start(&self) -> Result<()>;

    /// Whether the renderer is currently running
    async fn is_alive(&self) -> bool;

    /// Write one JSON line to the renderer
    async fn send(&self, line: String) -> Result<()>;

    /// Read one JSON line from the renderer
    async fn recv(&self) -> Result<String>;

    /// Terminate the renderer
    async fn stop(&self);
}

/// Bridge to the rendering side-process
pub struct Backend {
    transport: Arc<dyn RenderTransport>,
    timeout: Duration,
    retries_left: AtomicU32,
    // One render round-trip in flight at a time; responses carry no
    // correlation id, so send and recv must pair up under the same guard.
    io_lock: Mutex<()>,
}

impl Backend {
    pub fn new(transport: Arc<dyn RenderTransport>, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            retries_left: AtomicU32::new(MAX_RETRIES),
            io_lock: Mutex::new(()),
        }
    }

    /// Install the process-wide backend, reusing any existing handle.
    ///
    /// Duplicate initialization never spawns a second renderer.
    pub fn initialize(transport: Arc<dyn RenderTransport>, timeout: Duration) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::new(transport, timeout)))
            .clone()
    }

    /// The process-wide backend, if initialized
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    /// Ensure the renderer is running, restarting within the retry budget
    pub async fn check_backend(&self) -> Result<()> {
        if self.transport.is_alive().await {
            return Ok(());
        }
        let remaining = self
            .retries_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| {
                RenderError::Backend("renderer restart budget exhausted".to_string())
            })?;
        warn!(retries_left = remaining - 1, "renderer not running, restarting");
        self.transport.start().await
    }

    /// Submit one render request and wait for its result, bounded by the
    /// configured timeout
    pub async fn submit(&self, request: RenderRequest) -> Result<RenderResult> {
        self.check_backend().await?;

        let is_svg = request.format == Some(ImageFormat::Svg);
        let line = serde_json::to_string(&request)?;

        let _guard = self.io_lock.lock().await;
        self.transport.send(line).await?;
        let raw = tokio::time::timeout(self.timeout, self.transport.recv())
            .await
            .map_err(|_| RenderError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;
        drop(_guard);

        let response: Value = serde_json::from_str(&raw)?;
        let payload = response
            .get("result")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RenderError::Failure("no result in renderer response".to_string()))?
            .to_string();

        debug!(bytes = payload.len(), svg = is_svg, "render completed");
        if is_svg {
            Ok(RenderResult::Svg(payload))
        } else {
            Ok(RenderResult::Raster(payload))
        }
    }

    /// Process-exit hook: terminate the renderer
    pub async fn shutdown(&self) {
        self.transport.stop().await;
    }
}

/// Spawned child process speaking JSON lines over stdin/stdout
pub struct ProcessTransport {
    program: String,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    stdout: Mutex<Option<Lines<BufReader<ChildStdout>>>>,
}

impl ProcessTransport {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: Mutex::new(None),
            stdin: Mutex::new(None),
            stdout: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RenderTransport for ProcessTransport {
    async fn start(&self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| {
            RenderError::Backend("renderer stdin not captured".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            RenderError::Backend("renderer stdout not captured".to_string())
        })?;

        *self.stdin.lock().await = Some(stdin);
        *self.stdout.lock().await = Some(BufReader::new(stdout).lines());
        *self.child.lock().await = Some(child);
        debug!(program = %self.program, "renderer started");
        Ok(())
    }

    async fn is_alive(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn send(&self, line: String) -> Result<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| RenderError::Backend("renderer not started".to_string()))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn recv(&self) -> Result<String> {
        let mut guard = self.stdout.lock().await;
        let lines = guard
            .as_mut()
            .ok_or_else(|| RenderError::Backend("renderer not started".to_string()))?;
        lines
            .next_line()
            .await?
            .ok_or_else(|| RenderError::Backend("renderer closed its stdout".to_string()))
    }

    async fn stop(&self) {
        if let Some(mut child) = self.child.lock().await.take() {
            let _ = child.kill().await;
        }
        *self.stdin.lock().await = None;
        *self.stdout.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::mpsc;

    /// In-memory transport: queued responses, switchable liveness
    struct StubTransport {
        alive: AtomicBool,
        starts: AtomicU32,
        responses: Mutex<mpsc::UnboundedReceiver<String>>,
        tx: mpsc::UnboundedSender<String>,
    }

    impl StubTransport {
        fn new(alive: bool) -> Arc<Self> {
            let (tx, rx) = mpsc::unbounded_channel();
            Arc::new(Self {
                alive: AtomicBool::new(alive),
                starts: AtomicU32::new(0),
                responses: Mutex::new(rx),
                tx,
            })
        }

        fn queue_response(&self, line: &str) {
            self.tx.send(line.to_string()).expect("queue");
        }
    }

    #[async_trait]
    impl RenderTransport for StubTransport {
        async fn start(&self) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            self.alive.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }

        async fn send(&self, _line: String) -> Result<()> {
            Ok(())
        }

        async fn recv(&self) -> Result<String> {
            let mut rx = self.responses.lock().await;
            match rx.recv().await {
                Some(line) => Ok(line),
                None => std::future::pending().await,
            }
        }

        async fn stop(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }
    }

    fn request() -> RenderRequest {
        RenderRequest::image(serde_json::json!({"data": []}), ImageFormat::Png, 1.0)
    }

    #[tokio::test]
    async fn test_submit_returns_raster_payload() {
        let transport = StubTransport::new(true);
        transport.queue_response(r#"{"result": "aGVsbG8="}"#);
        let backend = Backend::new(transport, DEFAULT_TIMEOUT);
        let result = backend.submit(request()).await.expect("submit");
        assert_eq!(result, RenderResult::Raster("aGVsbG8=".to_string()));
    }

    #[tokio::test]
    async fn test_submit_svg_is_text() {
        let transport = StubTransport::new(true);
        transport.queue_response(r#"{"result": "<svg></svg>"}"#);
        let backend = Backend::new(transport, DEFAULT_TIMEOUT);
        let result = backend
            .submit(RenderRequest::image(
                serde_json::json!({"data": []}),
                ImageFormat::Svg,
                1.0,
            ))
            .await
            .expect("submit");
        assert_eq!(result, RenderResult::Svg("<svg></svg>".to_string()));
    }

    #[tokio::test]
    async fn test_missing_result_is_failure() {
        let transport = StubTransport::new(true);
        transport.queue_response(r#"{"status": "ok"}"#);
        let backend = Backend::new(transport, DEFAULT_TIMEOUT);
        let err = backend.submit(request()).await.expect_err("should fail");
        assert!(matches!(err, RenderError::Failure(_)));
    }

    #[tokio::test]
    async fn test_empty_result_is_failure() {
        let transport = StubTransport::new(true);
        transport.queue_response(r#"{"result": ""}"#);
        let backend = Backend::new(transport, DEFAULT_TIMEOUT);
        let err = backend.submit(request()).await.expect_err("should fail");
        assert!(matches!(err, RenderError::Failure(_)));
    }

    #[tokio::test]
    async fn test_submit_times_out_without_response() {
        let transport = StubTransport::new(true);
        let backend = Backend::new(transport, Duration::from_millis(50));
        let err = backend.submit(request()).await.expect_err("should time out");
        assert!(matches!(err, RenderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_check_backend_restarts_dead_renderer() {
        let transport = StubTransport::new(false);
        let backend = Backend::new(transport.clone(), DEFAULT_TIMEOUT);
        backend.check_backend().await.expect("restart");
        assert_eq!(transport.starts.load(Ordering::SeqCst), 1);
        assert!(transport.is_alive().await);
    }

    #[tokio::test]
    async fn test_restart_budget_exhausts() {
        let transport = StubTransport::new(false);
        let backend = Backend::new(transport.clone(), DEFAULT_TIMEOUT);
        backend.retries_left.store(0, Ordering::SeqCst);
        let err = backend.check_backend().await.expect_err("budget spent");
        assert!(matches!(err, RenderError::Backend(_)));
        assert_eq!(transport.starts.load(Ordering::SeqCst), 0);
    }
}
