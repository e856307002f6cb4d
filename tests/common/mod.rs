//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use provider_monitor::config::{MonitorConfig, ProviderConfig, SharedConfig};
use provider_monitor::health::{HealthMonitor, MonitorBuilder};
use provider_monitor::providers::{HealthCheckable, ProviderError, ProviderRegistry};
use provider_monitor::storage;

/// Error every failing scripted probe reports.
pub const PROBE_ERROR: &str = "Connection timeout";

/// Switchable probe outcome shared by every client of a scripted kind.
#[derive(Default)]
pub struct Script {
    failing: AtomicBool,
    calls: AtomicU32,
}

impl Script {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

struct ScriptedClient {
    script: Arc<Script>,
}

#[async_trait]
impl HealthCheckable for ScriptedClient {
    async fn test_connection(&self) -> Result<Option<u16>, ProviderError> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        if self.script.failing.load(Ordering::SeqCst) {
            Err(ProviderError::Other(PROBE_ERROR.into()))
        } else {
            Ok(Some(200))
        }
    }
}

/// Registry with a single `scripted` kind driven by `script`.
pub fn scripted_registry(script: Arc<Script>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register("scripted", move |_| {
        Ok(Box::new(ScriptedClient { script: script.clone() }) as Box<dyn HealthCheckable>)
    });
    registry
}

/// Monitor environment backed by a temporary database.
#[allow(dead_code)]
pub struct TestEnv {
    pub dir: tempfile::TempDir,
    pub shared: SharedConfig,
    pub script: Arc<Script>,
    pub pool: storage::DbPool,
}

#[allow(dead_code)]
impl TestEnv {
    /// Environment where every named provider uses the scripted kind.
    pub fn new(providers: &[(&str, bool)]) -> Self {
        let mut config = MonitorConfig::default();
        for (name, enabled) in providers {
            let mut provider = ProviderConfig::new(*name, "scripted");
            provider.enabled = *enabled;
            config.providers.push(provider);
        }

        let dir = tempfile::tempdir().unwrap();
        let pool = storage::open(&dir.path().join("health.sqlite"), 4).unwrap();
        Self {
            dir,
            shared: SharedConfig::new(config),
            script: Script::new(),
            pool,
        }
    }

    pub fn builder(&self) -> MonitorBuilder {
        HealthMonitor::builder(self.pool.clone(), Arc::new(self.shared.clone()))
            .registry(scripted_registry(self.script.clone()))
    }

    pub fn monitor(&self) -> HealthMonitor {
        self.builder().build()
    }
}

/// Start a mock webhook receiver that answers every request with `status`.
///
/// Returns the bound address and the JSON bodies received so far.
#[allow(dead_code)]
pub async fn start_webhook_sink(status: u16) -> (SocketAddr, Arc<Mutex<Vec<serde_json::Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let sink = sink.clone();
                    tokio::spawn(async move {
                        if let Some(body) = read_request_body(&mut socket).await {
                            if let Ok(json) = serde_json::from_slice(&body) {
                                sink.lock().unwrap().push(json);
                            }
                        }
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, received)
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = end + 4;
        if buf.len() >= body_start + length {
            return Some(buf[body_start..body_start + length].to_vec());
        }
    }
}
