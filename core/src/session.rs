//! Ownership of the underlying HTTP client.
//!
//! # Design
//! A `Session` wraps one reqwest `Client`, its connection pool, and the small
//! tokio runtime that drives it. It is opened from a `SessionConfig`, shared
//! by reference across any number of operations, and released with `close`.
//! The pool is thread-safe, so a session may also be used from several
//! threads at once.
//!
//! Every request races against the session's close signal. `close` fires it,
//! so requests already on the wire are dropped with their connections and
//! return `ClientError::Transport`. Operations started afterwards fail the
//! same way. Closing is the only way to cancel a request.
//!
//! Server-side analyses can keep a request open far longer than typical web
//! timeouts, hence the one-hour default.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, Proxy};
use serde::Deserialize;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::message::MessageLog;

/// Default socket timeout: one hour.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60 * 60;

/// Default cap on a response body: 64 MiB.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

const DEFAULT_IDLE_PER_HOST: usize = 3;

/// Executes an `HttpRequest` and returns the server's answer as data.
///
/// Non-2xx statuses are returned as `Ok`; interpreting them is the caller's job.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Settings applied when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Socket timeout for connecting and for each read.
    pub timeout_secs: u64,
    /// Proxy URL such as `http://proxy.local:3128`.
    pub proxy: Option<String>,
    pub max_idle_connections_per_host: usize,
    /// Response bytes kept; the rest of a longer body is discarded.
    pub max_response_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
            max_idle_connections_per_host: DEFAULT_IDLE_PER_HOST,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl SessionConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the HTTP client. Performs no network I/O.
    ///
    /// System proxy variables are ignored; only `proxy` is used.
    pub fn open(&self) -> Result<Session, ClientError> {
        if self.timeout_secs == 0 {
            return Err(ClientError::TransportInit(
                "timeout must be at least one second".to_string(),
            ));
        }

        let mut builder = Client::builder()
            .connect_timeout(self.timeout())
            .read_timeout(self.timeout())
            .pool_max_idle_per_host(self.max_idle_connections_per_host)
            .no_proxy();
        if let Some(p) = self.proxy.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            let proxy = Proxy::all(p)
                .map_err(|e| ClientError::TransportInit(format!("invalid proxy `{p}`: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::TransportInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("analysis-client-http")
            .enable_all()
            .build()
            .map_err(|e| ClientError::TransportInit(format!("cannot start I/O runtime: {e}")))?;

        let (closed, _) = watch::channel(false);
        debug!(timeout_secs = self.timeout_secs, "opened HTTP session");
        Ok(Session {
            runtime: Some(runtime),
            client: RwLock::new(Some(client)),
            closed,
            timeout_secs: self.timeout_secs,
            max_response_bytes: self.max_response_bytes,
        })
    }
}

/// An open HTTP client and its connection pool.
///
/// `execute` blocks the calling thread and must not be called from inside
/// an async runtime.
pub struct Session {
    // `None` only while dropping.
    runtime: Option<Runtime>,
    client: RwLock<Option<Client>>,
    closed: watch::Sender<bool>,
    timeout_secs: u64,
    max_response_bytes: usize,
}

impl Session {
    /// Open a session with the default configuration.
    pub fn open() -> Result<Self, ClientError> {
        SessionConfig::default().open()
    }

    pub fn is_closed(&self) -> bool {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Release the client and its pooled connections, and abort requests in
    /// flight.
    ///
    /// Closing an already closed session is reported as a warning in `log`
    /// and otherwise ignored.
    pub fn close(&self, log: &mut MessageLog) {
        let released = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match released {
            Some(client) => {
                drop(client);
                self.closed.send_replace(true);
                debug!("closed HTTP session");
            }
            None => {
                warn!("close called on an already closed HTTP session");
                log.warn("HTTP session was already closed");
            }
        }
    }

    fn client(&self) -> Result<Client, ClientError> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ClientError::transport("HTTP session is closed"))
    }
}

impl Transport for Session {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let client = self.client()?;
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| ClientError::transport("HTTP session is closed"))?;
        let mut closed = self.closed.subscribe();

        let response = runtime.block_on(async {
            tokio::select! {
                biased;
                _ = closed.wait_for(|closed| *closed) => {
                    Err(ClientError::transport("HTTP session closed while the request was in flight"))
                }
                response = send(&client, request, self.max_response_bytes) => response,
            }
        })?;

        debug!(status = response.status, "response received");
        Ok(response)
    }
}

async fn send(
    client: &Client,
    request: &HttpRequest,
    max_response_bytes: usize,
) -> Result<HttpResponse, ClientError> {
    let method = match request.method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    };
    let mut builder = client.request(method, request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    // reqwest sends a body on any method, DELETE included.
    builder = match &request.body {
        None => builder,
        Some(RequestBody::Bytes(bytes)) => builder.body(bytes.clone()),
        Some(RequestBody::Multipart(form)) => builder.multipart(form.to_reqwest()?),
    };

    let mut response = builder.send().await.map_err(ClientError::transport)?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(ClientError::transport)? {
        let room = max_response_bytes - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            warn!(status, limit = max_response_bytes, "response body truncated");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(HttpResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("timeout_secs", &self.timeout_secs)
            .field("closed", &self.is_closed())
            .finish()
    }
}
