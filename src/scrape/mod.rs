//! Per-domain scrapers: log into the portal, walk the remote endpoints and
//! normalize what comes back into plain records for the sync services.

pub mod assignment;
pub mod course;
pub mod discussion;
pub mod notification;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::ucloud::dto;

/// Epoch values above this are milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Remote wall-clock times are China Standard Time.
const REMOTE_UTC_OFFSET_SECS: i32 = 8 * 3600;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Best-effort timestamp parser. Accepts the date-time layouts the portal
/// uses as well as epoch seconds or milliseconds, either as numbers or as
/// numeric strings. Anything else yields `None`.
pub fn parse_time(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_time_str(s),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    }
}

pub fn parse_time_opt(value: Option<&Value>) -> Option<NaiveDateTime> {
    value.and_then(parse_time)
}

pub fn parse_time_str(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.contains('-') {
        for format in DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(s, format) {
                return Some(parsed);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    s.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(ts: i64) -> Option<NaiveDateTime> {
    let (secs, millis) = if ts > EPOCH_MILLIS_THRESHOLD {
        (ts.div_euclid(1000), ts.rem_euclid(1000))
    } else {
        (ts, 0)
    };
    let offset = FixedOffset::east_opt(REMOTE_UTC_OFFSET_SECS)?;
    let nanos = u32::try_from(millis * 1_000_000).ok()?;

    DateTime::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&offset).naive_local())
}

/// Remote ids and scores arrive as strings or numbers.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn opt_value_to_string(value: Option<&Value>) -> Option<String> {
    value.and_then(value_to_string)
}

/// Counters arrive as numbers or numeric strings.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn opt_value_to_i64(value: Option<&Value>) -> Option<i64> {
    value.and_then(value_to_i64)
}

/// Course id, from `id` or else `siteId`. A blank `id` falls through.
pub fn site_id(record: &dto::SiteRecord) -> Option<String> {
    opt_value_to_string(record.id.as_ref()).or_else(|| opt_value_to_string(record.site_id.as_ref()))
}

/// First non-blank candidate.
pub fn first_non_blank<'a>(
    candidates: impl IntoIterator<Item = Option<&'a str>>,
) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_portal_date_layouts() {
        assert_eq!(parse_time(&json!("2026-01-09 23:59")), Some(at(2026, 1, 9, 23, 59, 0)));
        assert_eq!(parse_time(&json!("2026-01-09 23:59:30")), Some(at(2026, 1, 9, 23, 59, 30)));
        assert_eq!(parse_time(&json!("2025-09-01T08:00:00")), Some(at(2025, 9, 1, 8, 0, 0)));
        assert_eq!(parse_time(&json!("2025-09-01")), Some(at(2025, 9, 1, 0, 0, 0)));
    }

    #[test]
    fn parses_epoch_seconds_and_millis_as_beijing_time() {
        // 2024-01-01T00:00:00Z
        let expected = at(2024, 1, 1, 8, 0, 0);
        assert_eq!(parse_time(&json!(1704067200)), Some(expected));
        assert_eq!(parse_time(&json!(1704067200000_i64)), Some(expected));
        assert_eq!(parse_time(&json!("1704067200000")), Some(expected));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_time(&json!(null)), None);
        assert_eq!(parse_time(&json!("")), None);
        assert_eq!(parse_time(&json!("next friday")), None);
        assert_eq!(parse_time(&json!("2026-13-45 99:99")), None);
        assert_eq!(parse_time(&json!(true)), None);
    }

    #[test]
    fn ids_become_strings() {
        assert_eq!(
            value_to_string(&json!(2000742433166016525_u64)).as_deref(),
            Some("2000742433166016525")
        );
        assert_eq!(value_to_string(&json!(" abc ")).as_deref(), Some("abc"));
        assert_eq!(value_to_string(&json!("   ")), None);
        assert_eq!(value_to_string(&json!(null)), None);
    }

    #[test]
    fn counters_accept_numeric_strings() {
        assert_eq!(value_to_i64(&json!(12)), Some(12));
        assert_eq!(value_to_i64(&json!(" 12 ")), Some(12));
        assert_eq!(value_to_i64(&json!(3.0)), Some(3));
        assert_eq!(value_to_i64(&json!("many")), None);
        assert_eq!(value_to_i64(&json!(null)), None);
    }

    #[test]
    fn blank_course_id_falls_back_to_site_id() {
        let record: dto::SiteRecord =
            serde_json::from_value(json!({"id": "  ", "siteId": 10042})).unwrap();
        assert_eq!(site_id(&record).as_deref(), Some("10042"));

        let record: dto::SiteRecord =
            serde_json::from_value(json!({"id": "", "siteId": null})).unwrap();
        assert_eq!(site_id(&record), None);
    }

    #[test]
    fn fallback_chain_skips_blanks() {
        assert_eq!(first_non_blank([None, Some("  "), Some("Python")]).as_deref(), Some("Python"));
        assert_eq!(first_non_blank([None, None]), None);
    }
}
