//! Request and response bodies exchanged with devices.

use chrono::{DateTime, Utc};

use crate::{format_duration, StatsResult};

/// Body of `POST /api/v1/devices/{id}/heartbeat`.
///
/// `sent_at` is optional at the parsing layer so a missing field can be
/// reported as a validation error rather than a JSON error.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartbeatRequest {
    #[cfg_attr(feature = "serde", serde(default))]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/v1/devices/{id}/stats`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UploadStatRequest {
    #[cfg_attr(feature = "serde", serde(default))]
    pub sent_at: Option<DateTime<Utc>>,

    /// Upload duration in nanoseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub upload_time: i64,
}

/// Body of a successful `GET /api/v1/devices/{id}/stats`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsResponse {
    /// Uptime percentage, 0-100.
    pub uptime: f64,
    /// Average upload duration in Go duration form, e.g. `"7.5s"`.
    pub avg_upload_time: String,
}

impl From<&StatsResult> for StatsResponse {
    fn from(stats: &StatsResult) -> Self {
        Self {
            uptime: stats.uptime_percent,
            avg_upload_time: format_duration(stats.avg_upload_duration),
        }
    }
}

/// Body of every 4xx/5xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorResponse {
    pub msg: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
