//! Temporal classification of shows and the start-time wire format.

use chrono::NaiveDateTime;

/// Render a naive start time in the wire format: ISO-8601 with millisecond
/// precision and a literal `Z` suffix. The stored value carries no timezone
/// and is treated as already UTC.
pub fn format_start_time(start: NaiveDateTime) -> String {
    format!("{}Z", start.format("%Y-%m-%dT%H:%M:%S%.3f"))
}

/// Split items into `(past, upcoming)` around `now`, preserving order.
/// An item starting exactly at `now` counts as upcoming.
pub fn partition_by_start<T, F>(items: Vec<T>, now: NaiveDateTime, start_of: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> NaiveDateTime,
{
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for item in items {
        if start_of(&item) >= now {
            upcoming.push(item);
        } else {
            past.push(item);
        }
    }
    (past, upcoming)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_format_millisecond_precision_and_z_suffix() {
        let start = ts(2019, 5, 21, 21, 30, 0);
        assert_eq!(format_start_time(start), "2019-05-21T21:30:00.000Z");
    }

    #[test]
    fn test_format_keeps_submillisecond_truncated() {
        let start = ts(2035, 4, 1, 20, 0, 0) + Duration::milliseconds(123);
        assert_eq!(format_start_time(start), "2035-04-01T20:00:00.123Z");
    }

    #[test]
    fn test_partition_is_exact() {
        let now = ts(2026, 1, 1, 12, 0, 0);
        let items = vec![
            now - Duration::days(1),
            now - Duration::seconds(1),
            now + Duration::seconds(1),
            now + Duration::days(400),
        ];
        let (past, upcoming) = partition_by_start(items.clone(), now, |t| *t);
        assert_eq!(past.len() + upcoming.len(), items.len());
        assert!(past.iter().all(|t| *t < now));
        assert!(upcoming.iter().all(|t| *t >= now));
        assert_eq!(past.len(), 2);
        assert_eq!(upcoming.len(), 2);
    }

    #[test]
    fn test_partition_boundary_counts_as_upcoming() {
        let now = ts(2026, 1, 1, 12, 0, 0);
        let (past, upcoming) = partition_by_start(vec![now], now, |t| *t);
        assert!(past.is_empty());
        assert_eq!(upcoming, vec![now]);
    }

    #[test]
    fn test_partition_preserves_order() {
        let now = ts(2026, 1, 1, 0, 0, 0);
        let items = vec![
            (now + Duration::days(3), "c"),
            (now - Duration::days(1), "a"),
            (now + Duration::days(1), "b"),
        ];
        let (past, upcoming) = partition_by_start(items, now, |(t, _)| *t);
        let names: Vec<&str> = upcoming.iter().map(|(_, n)| *n).collect();
        assert_eq!(names, vec!["c", "b"]);
        assert_eq!(past.len(), 1);
    }

    #[test]
    fn test_partition_empty() {
        let now = ts(2026, 1, 1, 0, 0, 0);
        let (past, upcoming) = partition_by_start(Vec::<NaiveDateTime>::new(), now, |t| *t);
        assert!(past.is_empty());
        assert!(upcoming.is_empty());
    }
}
