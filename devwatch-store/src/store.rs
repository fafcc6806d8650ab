//! Thread-safe home for every device's aggregate record.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use devwatch_types::{AggregateRecord, StatsResult};
use parking_lot::RwLock;

use crate::roster::{self, RosterError};
use crate::stats;

/// Aggregation store keyed by device id.
///
/// The set of devices is fixed when the store is built from a roster; later
/// calls only mutate existing records. Lookups of unknown ids report
/// `false`/`None` and never touch state.
///
/// All records sit behind one reader/writer lock. Queries share it, while
/// recording a heartbeat or upload takes it exclusively, so each record
/// update is applied as a whole or not at all.
///
/// # Example
///
/// ```rust
/// use devwatch_store::DeviceStore;
/// use chrono::{TimeDelta, Utc};
///
/// let store = DeviceStore::from_roster(["camera-1", "camera-2"]);
///
/// assert!(store.record_heartbeat("camera-1", Utc::now()));
/// assert!(store.record_upload("camera-1", TimeDelta::seconds(4)));
/// assert!(!store.record_heartbeat("camera-9", Utc::now()));
///
/// let stats = store.stats("camera-1").unwrap();
/// assert_eq!(stats.uptime_percent, 100.0);
/// assert_eq!(stats.avg_upload_duration, TimeDelta::seconds(4));
/// ```
#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: RwLock<BTreeMap<String, AggregateRecord>>,
}

impl DeviceStore {
    /// Build a store with one zeroed record per roster entry.
    ///
    /// Duplicate ids collapse into a single record.
    pub fn from_roster<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let devices = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), AggregateRecord::new(id))
            })
            .collect();

        Self {
            devices: RwLock::new(devices),
        }
    }

    /// Build a store from a CSV roster file (see [`roster::load_csv`]).
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let ids = roster::load_csv(path)?;
        Ok(Self::from_roster(ids))
    }

    /// Whether the device is on the roster.
    pub fn exists(&self, device_id: &str) -> bool {
        self.devices.read().contains_key(device_id)
    }

    /// Record a heartbeat sent at `sent_at`.
    ///
    /// The first heartbeat fixes `first_heartbeat_at`; every heartbeat
    /// overwrites `last_heartbeat_at`, even one older than the current value.
    /// Returns `false` for unknown devices.
    pub fn record_heartbeat(&self, device_id: &str, sent_at: DateTime<Utc>) -> bool {
        let mut devices = self.devices.write();
        let Some(record) = devices.get_mut(device_id) else {
            return false;
        };

        record.heartbeat_count = record.heartbeat_count.saturating_add(1);
        record.first_heartbeat_at.get_or_insert(sent_at);
        record.last_heartbeat_at = Some(sent_at);
        true
    }

    /// Record one upload sample of the given duration.
    ///
    /// The duration is taken as-is; range checks belong to the caller.
    /// Returns `false` for unknown devices.
    pub fn record_upload(&self, device_id: &str, duration: TimeDelta) -> bool {
        let mut devices = self.devices.write();
        let Some(record) = devices.get_mut(device_id) else {
            return false;
        };

        record.upload_count = record.upload_count.saturating_add(1);
        record.upload_time_sum = saturating_add(record.upload_time_sum, duration);
        true
    }

    /// Derive current statistics for a device, or `None` if it is unknown.
    pub fn stats(&self, device_id: &str) -> Option<StatsResult> {
        self.devices.read().get(device_id).map(stats::derive)
    }

    /// Copy of a device's current record.
    pub fn snapshot(&self, device_id: &str) -> Option<AggregateRecord> {
        self.devices.read().get(device_id).cloned()
    }

    /// All known device ids, sorted.
    pub fn device_ids(&self) -> Vec<String> {
        self.devices.read().keys().cloned().collect()
    }

    /// Number of devices on the roster.
    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }
}

fn saturating_add(sum: TimeDelta, d: TimeDelta) -> TimeDelta {
    sum.checked_add(&d).unwrap_or(if d < TimeDelta::zero() {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}
