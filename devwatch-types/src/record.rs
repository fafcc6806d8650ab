//! Per-device aggregate state and the statistics derived from it.

use chrono::{DateTime, TimeDelta, Utc};

/// Bounded telemetry summary for a single device.
///
/// One record exists per known device for the lifetime of the process.
/// It replaces raw event history with counters, the first/last heartbeat
/// timestamps and a running upload-duration sum, so memory stays constant
/// no matter how much telemetry arrives.
///
/// `first_heartbeat_at` and `last_heartbeat_at` are both `None` until the
/// first heartbeat. After that `first_heartbeat_at` never changes, while
/// `last_heartbeat_at` holds whatever timestamp arrived most recently, even
/// when it is earlier than the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRecord {
    /// Device identifier from the roster.
    pub id: String,

    /// Number of heartbeats recorded.
    pub heartbeat_count: u64,

    /// Timestamp carried by the first heartbeat ever recorded.
    pub first_heartbeat_at: Option<DateTime<Utc>>,

    /// Timestamp carried by the most recently recorded heartbeat.
    pub last_heartbeat_at: Option<DateTime<Utc>>,

    /// Number of upload samples recorded.
    pub upload_count: u64,

    /// Sum of all recorded upload durations.
    pub upload_time_sum: TimeDelta,
}

impl AggregateRecord {
    /// Create a zeroed record for a device.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            heartbeat_count: 0,
            first_heartbeat_at: None,
            last_heartbeat_at: None,
            upload_count: 0,
            upload_time_sum: TimeDelta::zero(),
        }
    }
}

/// Statistics derived from an [`AggregateRecord`].
///
/// `uptime_percent` is only meaningful when `has_heartbeats` is set, and
/// `avg_upload_duration` only when `has_uploads` is set; otherwise they are
/// zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsResult {
    pub has_heartbeats: bool,
    pub has_uploads: bool,
    /// Estimated percentage of time online, capped at 100.
    pub uptime_percent: f64,
    /// Mean upload duration, truncated toward zero.
    pub avg_upload_duration: TimeDelta,
}

impl StatsResult {
    /// True when the device is known but has not reported anything yet.
    pub fn is_empty(&self) -> bool {
        !self.has_heartbeats && !self.has_uploads
    }
}

impl Default for StatsResult {
    fn default() -> Self {
        Self {
            has_heartbeats: false,
            has_uploads: false,
            uptime_percent: 0.0,
            avg_upload_duration: TimeDelta::zero(),
        }
    }
}
