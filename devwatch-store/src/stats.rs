//! Derivation of reported metrics from an aggregate record.

use chrono::TimeDelta;
use devwatch_types::{total_nanos, AggregateRecord, StatsResult};

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Turn a record into its reported statistics.
///
/// Uptime is heartbeat density over the observed span, counted in minute
/// slots: `count / (span_minutes + 1) * 100`, clamped to `0..=100`.
/// A single heartbeat is 100% uptime. The `+ 1` counts the first minute as
/// a full slot, so heartbeats at minutes 0 and N cover N + 1 slots.
/// Unlike a cap-only rule, the floor at 0 keeps reversed spans from
/// reporting a negative percentage.
///
/// The average upload duration is the sum divided by the count, truncated
/// toward zero.
pub fn derive(record: &AggregateRecord) -> StatsResult {
    let mut result = StatsResult::default();

    if record.heartbeat_count > 0 {
        result.has_heartbeats = true;
        result.uptime_percent = uptime_percent(record);
    }

    if record.upload_count > 0 {
        result.has_uploads = true;
        result.avg_upload_duration = average(record.upload_time_sum, record.upload_count);
    }

    result
}

fn uptime_percent(record: &AggregateRecord) -> f64 {
    if record.heartbeat_count == 1 {
        return 100.0;
    }

    match (record.first_heartbeat_at, record.last_heartbeat_at) {
        (Some(first), Some(last)) => {
            let slots = span_minutes(last - first) + 1.0;
            // Several heartbeats can land in one slot.
            (record.heartbeat_count as f64 / slots * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}

/// Fractional minutes in a span, at nanosecond precision.
fn span_minutes(span: TimeDelta) -> f64 {
    span.num_seconds() as f64 / 60.0 + span.subsec_nanos() as f64 / 60e9
}

fn average(sum: TimeDelta, count: u64) -> TimeDelta {
    let avg = total_nanos(sum) / count as i128;
    TimeDelta::new(
        avg.div_euclid(NANOS_PER_SEC) as i64,
        avg.rem_euclid(NANOS_PER_SEC) as u32,
    )
    .unwrap_or_else(TimeDelta::zero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn heartbeats(count: u64, first: DateTime<Utc>, last: DateTime<Utc>) -> AggregateRecord {
        AggregateRecord {
            heartbeat_count: count,
            first_heartbeat_at: Some(first),
            last_heartbeat_at: Some(last),
            ..AggregateRecord::new("device")
        }
    }

    fn uploads(count: u64, sum: TimeDelta) -> AggregateRecord {
        AggregateRecord {
            upload_count: count,
            upload_time_sum: sum,
            ..AggregateRecord::new("device")
        }
    }

    #[test]
    fn zero_record_derives_empty_result() {
        let stats = derive(&AggregateRecord::new("device"));
        assert!(stats.is_empty());
        assert_eq!(stats.uptime_percent, 0.0);
        assert_eq!(stats.avg_upload_duration, TimeDelta::zero());
    }

    #[test]
    fn one_heartbeat_per_minute_is_full_uptime() {
        // 5 heartbeats from 10:00 through 10:04
        let stats = derive(&heartbeats(5, at(0), at(240)));
        assert_eq!(stats.uptime_percent, 100.0);
    }

    #[test]
    fn half_the_slots_is_half_uptime() {
        // 5 heartbeats across 10 minutes -> 5 / 10 slots
        let stats = derive(&heartbeats(5, at(0), at(540)));
        assert!((stats.uptime_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn span_uses_fractional_minutes() {
        // 2 heartbeats 90s apart -> 2 / 2.5 slots
        let stats = derive(&heartbeats(2, at(0), at(90)));
        assert!((stats.uptime_percent - 80.0).abs() < 1e-9);
    }

    #[test]
    fn identical_timestamps_are_capped() {
        let stats = derive(&heartbeats(3, at(0), at(0)));
        assert_eq!(stats.uptime_percent, 100.0);
    }

    #[test]
    fn reversed_span_stays_in_range() {
        let stats = derive(&heartbeats(2, at(600), at(0)));
        assert!(stats.has_heartbeats);
        assert!((0.0..=100.0).contains(&stats.uptime_percent));

        // span of exactly -1 minute leaves zero slots
        let stats = derive(&heartbeats(2, at(60), at(0)));
        assert_eq!(stats.uptime_percent, 100.0);
    }

    #[test]
    fn average_truncates_toward_zero() {
        assert_eq!(
            derive(&uploads(3, TimeDelta::nanoseconds(10))).avg_upload_duration,
            TimeDelta::nanoseconds(3)
        );
        assert_eq!(
            derive(&uploads(3, TimeDelta::nanoseconds(-10))).avg_upload_duration,
            TimeDelta::nanoseconds(-3)
        );
    }

    #[test]
    fn average_keeps_sub_second_precision() {
        let stats = derive(&uploads(2, TimeDelta::seconds(15)));
        assert_eq!(stats.avg_upload_duration, TimeDelta::milliseconds(7_500));
    }

    #[test]
    fn average_of_saturated_sum_does_not_panic() {
        let stats = derive(&uploads(2, TimeDelta::MAX));
        assert!(stats.avg_upload_duration > TimeDelta::zero());
        assert!(stats.avg_upload_duration < TimeDelta::MAX);
    }

    #[test]
    fn derivation_is_deterministic() {
        let record = AggregateRecord {
            upload_count: 4,
            upload_time_sum: TimeDelta::seconds(22),
            ..heartbeats(7, at(0), at(1_234))
        };
        assert_eq!(derive(&record), derive(&record));
    }
}
