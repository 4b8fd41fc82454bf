use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Inclusive upper bound: the last instant of `date`.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::microseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_the_whole_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let start = start_of_day(date);
        let end = end_of_day(date);
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert!(end < start_of_day(date.succ_opt().unwrap()));
        assert_eq!(end.date_naive(), date);
    }
}
