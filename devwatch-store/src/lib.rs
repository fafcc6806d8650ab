//! # devwatch-store
//!
//! Concurrent aggregation of per-device telemetry.
//!
//! Devices send liveness heartbeats and upload-duration samples. Instead of
//! keeping the raw events, the [`DeviceStore`] folds each one into a bounded
//! per-device [`AggregateRecord`] and derives uptime and average upload time
//! on demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use devwatch_store::DeviceStore;
//! use chrono::{TimeDelta, TimeZone, Utc};
//!
//! let store = DeviceStore::from_roster(["camera-1"]);
//! let start = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
//!
//! // Heartbeats at minutes 0 and 1, two uploads
//! store.record_heartbeat("camera-1", start);
//! store.record_heartbeat("camera-1", start + TimeDelta::minutes(1));
//! store.record_upload("camera-1", TimeDelta::seconds(5));
//! store.record_upload("camera-1", TimeDelta::seconds(15));
//!
//! let stats = store.stats("camera-1").unwrap();
//! assert_eq!(stats.uptime_percent, 100.0);
//! assert_eq!(stats.avg_upload_duration, TimeDelta::seconds(10));
//! ```
//!
//! ## Features
//!
//! - **Fixed roster**: devices are loaded once (see [`roster`]); unknown ids are reported, never created
//! - **Thread-safe**: share one store through `Arc` across request handlers
//! - **HTTP gateway**: the default `gateway` feature serves the store over hyper

mod stats;
mod store;

pub mod roster;

#[cfg(feature = "gateway")]
pub mod gateway;

pub use roster::RosterError;
pub use stats::derive;
pub use store::DeviceStore;

#[cfg(feature = "gateway")]
pub use gateway::{Gateway, GatewayConfig, GatewayError};

// Re-export types for convenience
pub use devwatch_types::{AggregateRecord, StatsResult};
