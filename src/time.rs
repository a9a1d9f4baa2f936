use chrono::{DateTime, Duration, Utc};
use crate::error::{ChartError, Result};

/// Milliseconds since the Unix epoch for an instant
#[must_use]
pub fn to_epoch_ms(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Instant for a millisecond timestamp, clamped to chrono's representable range
#[must_use]
pub fn from_epoch_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse an ISO-8601 duration such as `PT2H`, `PT30M`, `PT0S`, `P1DT2H` or `PT1.5S`
///
/// Only day, hour, minute and (fractional) second designators are accepted;
/// calendar units (years, months, weeks) have no fixed length and are rejected.
///
/// # Errors
///
/// Returns [`ChartError::InvalidDuration`] if the string is not a valid duration.
pub fn parse_iso_duration(s: &str) -> Result<Duration> {
    let invalid = || ChartError::InvalidDuration(s.to_string());

    let body = s.strip_prefix('P').ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return Err(invalid()),
        None => (body, None),
    };

    let mut total_ms: i64 = 0;

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D').ok_or_else(invalid)?;
        // Unsigned, so "P-1D" is rejected like "PT-5M"
        let days: u32 = days.parse().map_err(|_| invalid())?;
        total_ms = i64::from(days) * 86_400_000;
    }

    if let Some(mut rest) = time_part {
        for (designator, unit_ms) in [('H', 3_600_000.0), ('M', 60_000.0), ('S', 1_000.0)] {
            if let Some(pos) = rest.find(designator) {
                let amount: f64 = rest[..pos].parse().map_err(|_| invalid())?;
                if amount < 0.0 || !amount.is_finite() {
                    return Err(invalid());
                }
                #[allow(clippy::cast_possible_truncation)]
                let ms = (amount * unit_ms).round() as i64;
                total_ms = total_ms.checked_add(ms).ok_or_else(invalid)?;
                rest = &rest[pos + 1..];
            }
        }
        if !rest.is_empty() {
            return Err(invalid());
        }
    }

    Duration::try_milliseconds(total_ms).ok_or_else(invalid)
}

/// Format a duration as ISO-8601 (`PT2H30M`, `PT0S`, `P1DT1H`, `PT0.25S`)
#[must_use]
pub fn format_iso_duration(duration: Duration) -> String {
    let total_ms = duration.num_milliseconds();
    let (sign, total_ms) = if total_ms < 0 { ("-", -total_ms) } else { ("", total_ms) };

    let days = total_ms / 86_400_000;
    let hours = (total_ms % 86_400_000) / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    let mut out = format!("{sign}P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }

    let mut time = String::new();
    if hours > 0 {
        time.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        time.push_str(&format!("{minutes}M"));
    }
    if millis > 0 {
        let fraction = format!("{millis:03}");
        time.push_str(&format!("{seconds}.{}S", fraction.trim_end_matches('0')));
    } else if seconds > 0 || (days == 0 && time.is_empty()) {
        time.push_str(&format!("{seconds}S"));
    }

    if !time.is_empty() {
        out.push('T');
        out.push_str(&time);
    }
    out
}

/// Serde adapter for durations encoded as ISO-8601 strings
pub mod iso_duration_serde {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_iso_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_iso_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional ISO-8601 durations
pub mod option_iso_duration_serde {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&super::format_iso_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_iso_duration(&s))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
