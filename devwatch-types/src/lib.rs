//! # devwatch-types
//!
//! Core types for device telemetry aggregation. This crate defines the
//! bounded per-device summary kept by the aggregation store, the statistics
//! derived from it, and the JSON shapes exchanged with devices over HTTP.
//!
//! ## Design Goals
//!
//! - **Bounded state**: an [`AggregateRecord`] is a fixed-size summary, never raw event history
//! - **Optional serialization**: enable the `serde` feature for the wire types
//! - **Go-compatible durations**: [`format_duration`] renders `"7.5s"`, `"1m30s"`, `"250ms"`
//!
//! ## Features
//!
//! - `serde`: JSON serialization of the request/response types via serde
//!
//! ## Example
//!
//! ```rust
//! use devwatch_types::{format_duration, AggregateRecord, StatsResult};
//! use chrono::TimeDelta;
//!
//! let record = AggregateRecord::new("camera-17");
//! assert_eq!(record.heartbeat_count, 0);
//! assert!(record.first_heartbeat_at.is_none());
//!
//! let stats = StatsResult::default();
//! assert!(stats.is_empty());
//!
//! assert_eq!(format_duration(TimeDelta::milliseconds(7_500)), "7.5s");
//! ```

mod duration;
mod record;
mod wire;

pub use duration::*;
pub use record::*;
pub use wire::*;
