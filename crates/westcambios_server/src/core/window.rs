use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Window covering the last `days` days plus the rest of today,
/// as the half-open interval `[start, end)`.
pub fn day_window(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = Utc::now().date_naive();
    let start = (today - Duration::days(days)).and_time(NaiveTime::MIN).and_utc();
    let end = today.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);

    (start, end)
}

/// Parse an inclusive `YYYY-MM-DD` date range into `[start, end)`.
pub fn parse_date_range(
    start_date: &str,
    end_date: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), chrono::format::ParseError> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")?
        .and_time(NaiveTime::MIN)
        .and_utc();
    let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d")?
        .and_time(NaiveTime::MIN)
        .and_utc()
        + Duration::days(1);

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_window_contains_now() {
        let (start, end) = day_window(0);
        let now = Utc::now();

        assert!(start <= now);
        assert!(now < end);
    }

    #[test]
    fn test_day_window_reaches_back() {
        let (start, _) = day_window(7);
        assert!(start <= Utc::now() - Duration::days(7));
    }

    #[test]
    fn test_parse_date_range_is_end_inclusive() {
        let (start, end) = parse_date_range("2024-01-01", "2024-01-02").unwrap();

        assert_eq!(end - start, Duration::days(2));
    }

    #[test]
    fn test_parse_date_range_rejects_garbage() {
        assert!(parse_date_range("01/01/2024", "2024-01-02").is_err());
        assert!(parse_date_range("2024-01-01", "yesterday").is_err());
    }
}
