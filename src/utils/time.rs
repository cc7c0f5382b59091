use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Parses a `YYYY-MM-DD` filter value into the half-open day window
/// `[00:00 that day, 00:00 next day)`. Malformed values yield `None` and the
/// filter is ignored, matching lenient query-parameter handling.
pub fn day_window(value: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let start = date.and_time(NaiveTime::MIN).and_utc();
    Some((start, start + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_date_yields_one_day_window() {
        let (from, to) = day_window("2015-12-04").unwrap();
        assert_eq!(from.to_rfc3339(), "2015-12-04T00:00:00+00:00");
        assert_eq!(to - from, Duration::days(1));
    }

    #[test]
    fn malformed_dates_are_ignored() {
        assert!(day_window("2015-12").is_none());
        assert!(day_window("yesterday").is_none());
        assert!(day_window("").is_none());
    }
}
