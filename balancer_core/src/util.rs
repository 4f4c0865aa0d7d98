//! Common time and wire-decode helpers for balancer_core.

use serde::{Deserialize, Deserializer};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Current wall-clock time as epoch milliseconds. Outbound commands carry
/// this unit everywhere (see DESIGN.md).
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}

/// Current wall-clock time as epoch seconds (fractional), the unit inbound
/// telemetry timestamps use.
pub fn epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Unwrap an optional telemetry field, substituting `default` for missing
/// or non-finite values.
#[inline]
pub fn finite_or(v: Option<f64>, default: f64) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => default,
    }
}

/// Lenient numeric field decode: accepts numbers and numeric strings,
/// yields `None` for anything else (including NaN/±Inf). Never errors, so
/// one bad field cannot reject a whole payload.
pub fn de_lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|f| f.is_finite()))
}

/// Decode a nested payload object, falling back to its default when the
/// field is malformed (wrong JSON type, bad nesting).
pub fn de_or_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_or_substitutes_default() {
        assert_eq!(finite_or(Some(3.0), 0.0), 3.0);
        assert_eq!(finite_or(None, 1.5), 1.5);
        assert_eq!(finite_or(Some(f64::NAN), 2.0), 2.0);
        assert_eq!(finite_or(Some(f64::INFINITY), 2.0), 2.0);
    }

    #[test]
    fn epoch_ms_is_nonzero_and_recent() {
        // Sanity only: after 2020-01-01 in millis.
        assert!(epoch_ms() > 1_577_836_800_000);
    }
}
