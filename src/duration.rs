use chrono::TimeDelta;

use anyhow::{anyhow, bail, Result};

/// Suffix to nanoseconds multiplier
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

/// Parse duration strings like "1h", "1m30s", "500ms", "16.958µs".
///
/// Components may be chained and each may carry a fraction. A bare `"0"`
/// is accepted as zero.
pub fn parse_duration(s: &str) -> Result<TimeDelta> {
    let s = s.trim();
    if s == "0" {
        return Ok(TimeDelta::zero());
    }
    if s.is_empty() {
        bail!("Empty duration");
    }

    let mut rest = s;
    let mut nanos = 0.0;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            bail!("Unknown duration format: {}", s);
        }

        let (value, tail) = rest.split_at(digits);
        let value: f64 = value.parse()?;

        // longest match so "ms" wins over "m"
        let (suffix, multiplier) = UNITS
            .iter()
            .filter(|(suffix, _)| tail.starts_with(suffix))
            .max_by_key(|(suffix, _)| suffix.len())
            .ok_or_else(|| anyhow!("Unknown duration format: {}", s))?;

        nanos += value * multiplier;
        rest = &tail[suffix.len()..];
    }

    Ok(TimeDelta::nanoseconds(nanos.round() as i64))
}
