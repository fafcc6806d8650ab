//! HTTP ingestion gateway.
//!
//! Exposes the aggregation store over a small JSON API:
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | `POST` | `/api/v1/devices/{id}/heartbeat` | `204` |
//! | `POST` | `/api/v1/devices/{id}/stats` | `204` |
//! | `GET`  | `/api/v1/devices/{id}/stats` | `200` with stats, `204` with no data yet |
//! | `GET`  | `/health`, `/healthz` | `200` |
//!
//! Request bodies are validated here before anything reaches the store.
//! Unknown devices answer `404`. If the roster failed to load, every device
//! endpoint answers `500` with the configuration error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use devwatch_store::DeviceStore;
//! use devwatch_store::gateway::{Gateway, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(DeviceStore::from_roster(["camera-1"]));
//!     let config = GatewayConfig::builder()
//!         .listen_addr("127.0.0.1:6733")
//!         .build();
//!
//!     Gateway::new(store, config).run().await.unwrap();
//! }
//! ```

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use devwatch_types::{ErrorResponse, HeartbeatRequest, StatsResponse, UploadStatRequest};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::DeviceStore;

const DEVICES_PREFIX: &str = "/api/v1/devices/";

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on (e.g., "0.0.0.0:6733")
    pub listen_addr: String,
    /// Largest accepted upload duration
    pub max_upload_time: TimeDelta,
    /// How far in the future a heartbeat timestamp may be
    pub clock_skew: TimeDelta,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:6733".to_string(),
            max_upload_time: TimeDelta::hours(1),
            clock_skew: TimeDelta::minutes(1),
        }
    }
}

impl GatewayConfig {
    /// Create a new builder for GatewayConfig.
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for GatewayConfig.
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    listen_addr: Option<String>,
    max_upload_time: Option<TimeDelta>,
    clock_skew: Option<TimeDelta>,
}

impl GatewayConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the largest accepted upload duration.
    pub fn max_upload_time(mut self, max: TimeDelta) -> Self {
        self.max_upload_time = Some(max);
        self
    }

    /// Set the tolerated clock skew for heartbeat timestamps.
    pub fn clock_skew(mut self, skew: TimeDelta) -> Self {
        self.clock_skew = Some(skew);
        self
    }

    /// Build the GatewayConfig.
    pub fn build(self) -> GatewayConfig {
        let defaults = GatewayConfig::default();
        GatewayConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            max_upload_time: self.max_upload_time.unwrap_or(defaults.max_upload_time),
            clock_skew: self.clock_skew.unwrap_or(defaults.clock_skew),
        }
    }
}

/// Errors that stop the gateway from serving.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The configured listen address is not a socket address.
    #[error("invalid listen address {addr}: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding or accepting failed.
    #[error("gateway I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP front end for a [`DeviceStore`].
#[derive(Debug)]
pub struct Gateway {
    store: Arc<DeviceStore>,
    config: GatewayConfig,
    config_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Heartbeat,
    PostStats,
    GetStats,
}

impl Gateway {
    /// Create a gateway over a store.
    pub fn new(store: Arc<DeviceStore>, config: GatewayConfig) -> Self {
        Self {
            store,
            config,
            config_error: None,
        }
    }

    /// Mark the gateway as misconfigured.
    ///
    /// Every device endpoint then answers `500` with
    /// `"server configuration error: <err>"` instead of touching the store.
    pub fn with_config_error(mut self, err: impl Display) -> Self {
        self.config_error = Some(err.to_string());
        self
    }

    /// Get the store behind this gateway.
    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind the configured address and serve until an I/O error occurs.
    pub async fn run(self) -> Result<(), GatewayError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr: SocketAddr =
            self.config
                .listen_addr
                .parse()
                .map_err(|source| GatewayError::Addr {
                    addr: self.config.listen_addr.clone(),
                    source,
                })?;
        Ok(TcpListener::bind(addr).await?)
    }

    /// Accept connections on `listener`, one task per connection.
    pub async fn serve(self, listener: TcpListener) -> Result<(), GatewayError> {
        let gateway = Arc::new(self);

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let gateway = gateway.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let gateway = gateway.clone();
                    async move { Ok::<_, Infallible>(gateway.handle(req).await) }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = %e, "connection error");
                }
            });
        }
    }

    /// Handle a single request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let path = req.uri().path().to_string();

        if req.method() == Method::GET && (path == "/health" || path == "/healthz") {
            return text(StatusCode::OK, "OK");
        }

        let Some(route) = route(req.method(), &path) else {
            return text(StatusCode::NOT_FOUND, "Not Found");
        };

        if let Some(err) = &self.config_error {
            error!(error = %err, "configuration error");
            return error_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("server configuration error: {}", err),
            );
        }

        let Some(device_id) = device_id(&path) else {
            warn!(%path, "device id is not valid UTF-8");
            return error_json(StatusCode::NOT_FOUND, "device not found");
        };
        match route {
            Route::Heartbeat => self.post_heartbeat(&device_id, req.into_body()).await,
            Route::PostStats => self.post_stats(&device_id, req.into_body()).await,
            Route::GetStats => self.get_stats(&device_id),
        }
    }

    async fn post_heartbeat<B>(&self, device_id: &str, body: B) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        info!(device_id, "POST heartbeat");

        if !self.store.exists(device_id) {
            warn!(device_id, "device not found");
            return error_json(StatusCode::NOT_FOUND, "device not found");
        }

        let req: HeartbeatRequest = match read_json(body).await {
            Ok(req) => req,
            Err(e) => {
                error!(device_id, error = %e, "invalid JSON");
                return error_json(StatusCode::BAD_REQUEST, "invalid JSON");
            }
        };

        let sent_at = match self.validate_heartbeat(&req) {
            Ok(sent_at) => sent_at,
            Err(msg) => {
                error!(device_id, reason = msg, "validation failed");
                return error_json(StatusCode::BAD_REQUEST, msg);
            }
        };

        if !self.store.record_heartbeat(device_id, sent_at) {
            return error_json(StatusCode::NOT_FOUND, "device not found");
        }
        no_content()
    }

    async fn post_stats<B>(&self, device_id: &str, body: B) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        info!(device_id, "POST stats");

        if !self.store.exists(device_id) {
            warn!(device_id, "device not found");
            return error_json(StatusCode::NOT_FOUND, "device not found");
        }

        let req: UploadStatRequest = match read_json(body).await {
            Ok(req) => req,
            Err(e) => {
                error!(device_id, error = %e, "invalid JSON");
                return error_json(StatusCode::BAD_REQUEST, "invalid JSON");
            }
        };

        let upload_time = match self.validate_upload(&req) {
            Ok(upload_time) => upload_time,
            Err(msg) => {
                error!(device_id, reason = msg, "validation failed");
                return error_json(StatusCode::BAD_REQUEST, msg);
            }
        };

        if !self.store.record_upload(device_id, upload_time) {
            return error_json(StatusCode::NOT_FOUND, "device not found");
        }
        no_content()
    }

    fn get_stats(&self, device_id: &str) -> Response<Full<Bytes>> {
        info!(device_id, "GET stats");

        let Some(stats) = self.store.stats(device_id) else {
            warn!(device_id, "device not found");
            return error_json(StatusCode::NOT_FOUND, "device not found");
        };

        if stats.is_empty() {
            return no_content();
        }

        json(StatusCode::OK, &StatsResponse::from(&stats))
    }

    fn validate_heartbeat(&self, req: &HeartbeatRequest) -> Result<DateTime<Utc>, &'static str> {
        // The zero instant counts as missing.
        let sent_at = req
            .sent_at
            .filter(|t| *t != zero_instant())
            .ok_or("sent_at is required")?;

        let in_future = Utc::now()
            .checked_add_signed(self.config.clock_skew)
            .is_some_and(|limit| sent_at > limit);
        if in_future {
            return Err("sent_at cannot be in the future");
        }

        Ok(sent_at)
    }

    fn validate_upload(&self, req: &UploadStatRequest) -> Result<TimeDelta, &'static str> {
        // sent_at is optional here; devices may send a zero timestamp.
        if req.upload_time <= 0 {
            return Err("upload_time must be positive");
        }

        let upload_time = TimeDelta::nanoseconds(req.upload_time);
        if upload_time > self.config.max_upload_time {
            return Err("upload_time exceeds maximum");
        }

        Ok(upload_time)
    }
}

fn route(method: &Method, path: &str) -> Option<Route> {
    if !path.starts_with(DEVICES_PREFIX) {
        return None;
    }

    if path.ends_with("/heartbeat") && method == Method::POST {
        return Some(Route::Heartbeat);
    }

    if path.ends_with("/stats") {
        return match *method {
            Method::POST => Some(Route::PostStats),
            Method::GET => Some(Route::GetStats),
            _ => None,
        };
    }

    None
}

/// Percent-decoded device id segment of `/api/v1/devices/{id}/...`.
///
/// A missing segment is `""`; `None` if the decoded bytes are not UTF-8.
fn device_id(path: &str) -> Option<Cow<'_, str>> {
    let segment = path.split('/').nth(4).unwrap_or("");
    percent_decode_str(segment).decode_utf8().ok()
}

/// `0001-01-01T00:00:00Z`, the zero value of a Go `time.Time`.
fn zero_instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

async fn read_json<T, B>(body: B) -> Result<T, String>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Display,
{
    let bytes = body
        .collect()
        .await
        .map_err(|e| e.to_string())?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    respond(status, "text/plain", body)
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => respond(status, "application/json", body),
        Err(e) => {
            error!(error = %e, "failed to encode response");
            text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_json(status: StatusCode, msg: impl Into<String>) -> Response<Full<Bytes>> {
    json(status, &ErrorResponse::new(msg))
}

fn no_content() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}
