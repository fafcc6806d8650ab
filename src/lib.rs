//! # devwatch
//!
//! A small HTTP service that tracks device health from telemetry.
//!
//! Devices post liveness heartbeats and upload-duration samples; the service
//! keeps one bounded summary per device and reports uptime percentage and
//! average upload time on request. Raw events are never stored.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        devwatch                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────────────────┐ │
//! │  │ config  │───▶│  gateway  │───▶│    DeviceStore      │ │
//! │  │ (layers)│    │  (hyper)  │    │ RwLock<records>     │ │
//! │  └─────────┘    └───────────┘    └──────────┬──────────┘ │
//! │                                             │            │
//! │                                             ▼            │
//! │                                   ┌──────────────────┐   │
//! │                                   │  stats::derive   │   │
//! │                                   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: defaults, config file and `DEVWATCH_*` environment layering
//! - **[`duration`]**: parsing of duration settings such as `"1h"` or `"1m30s"`
//! - **`devwatch-store`**: the aggregation store, stats derivation, roster loading and HTTP gateway
//! - **`devwatch-types`**: records, stats results and wire types
//!
//! ## Usage
//!
//! ```bash
//! # Serve devices listed in devices.csv on port 6733
//! devwatch --devices devices.csv
//!
//! # Record a heartbeat and read back stats
//! curl -X POST localhost:6733/api/v1/devices/60-6b-44-84-dc-64/heartbeat \
//!      -d '{"sent_at": "2024-01-15T10:00:00Z"}'
//! curl localhost:6733/api/v1/devices/60-6b-44-84-dc-64/stats
//! ```

pub mod config;
pub mod duration;

pub use config::Settings;
