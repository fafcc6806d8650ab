//! Duration rendering for the wire format.
//!
//! Devices and dashboards already consume the Go `time.Duration` string form
//! (`"7.5s"`, `"1m30s"`, `"250ms"`), so averages are reported that way.

use chrono::TimeDelta;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Render a duration the way Go's `time.Duration::String` does.
///
/// Durations under one second use the largest fitting sub-second unit
/// (`ns`, `µs`, `ms`) with a trimmed fraction. Longer durations are split
/// into hours, minutes and fractional seconds, e.g. `"1h0m0.5s"`.
/// Zero renders as `"0s"`.
pub fn format_duration(d: TimeDelta) -> String {
    let nanos = total_nanos(d);
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let u = nanos.unsigned_abs();

    if u < NANOS_PER_SEC {
        let (unit, digits) = if u < 1_000 {
            ("ns", 0)
        } else if u < 1_000_000 {
            ("µs", 3)
        } else {
            ("ms", 6)
        };
        let scale = 10u128.pow(digits);
        return format!(
            "{}{}{}{}",
            sign,
            u / scale,
            fraction(u % scale, digits),
            unit
        );
    }

    let secs = u / NANOS_PER_SEC;
    let mut out = format!("{}{}s", secs % 60, fraction(u % NANOS_PER_SEC, 9));

    let mins = secs / 60;
    if mins > 0 {
        out = format!("{}m{}", mins % 60, out);
        let hours = mins / 60;
        if hours > 0 {
            out = format!("{}h{}", hours, out);
        }
    }

    format!("{}{}", sign, out)
}

/// Total signed nanoseconds in a duration, without the `i64` overflow
/// limit of `TimeDelta::num_nanoseconds`.
pub fn total_nanos(d: TimeDelta) -> i128 {
    d.num_seconds() as i128 * NANOS_PER_SEC as i128 + d.subsec_nanos() as i128
}

/// Fractional part padded to `digits`, trailing zeros trimmed, with a
/// leading `.`; empty when the fraction is zero.
fn fraction(value: u128, digits: u32) -> String {
    if value == 0 || digits == 0 {
        return String::new();
    }
    let padded = format!("{:0width$}", value, width = digits as usize);
    format!(".{}", padded.trim_end_matches('0'))
}
