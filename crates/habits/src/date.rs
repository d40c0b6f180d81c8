//! Local date keys
//!
//! Every log entry is keyed by the calendar date in the user's timezone,
//! formatted `YYYY-MM-DD`. Never derive keys from UTC: a habit ticked at
//! 23:30 local time belongs to that local day.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Date key format
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Date key for a datetime, in that datetime's own timezone
pub fn date_key<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(DATE_KEY_FORMAT).to_string()
}

/// Date key for a calendar date
pub fn key_for(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Today's date key in the local timezone
pub fn today_key() -> String {
    date_key(&Local::now())
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` key
pub fn parse_date_key(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_KEY_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Whether `date` lies after `today`
pub fn is_future(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_date_key_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(key_for(date), "2023-01-05");
    }

    #[test]
    fn test_date_key_uses_local_offset_not_utc() {
        // 23:30 on Jan 5 at UTC-5 is already Jan 6 in UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2023, 1, 5, 23, 30, 0).unwrap();
        assert_eq!(date_key(&dt), "2023-01-05");
        assert_eq!(date_key(&dt.with_timezone(&Utc)), "2023-01-06");
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(
            parse_date_key("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date_key("2023-02-29").is_err());
        assert!(parse_date_key("02/01/2024").is_err());
    }

    #[test]
    fn test_is_future() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(is_future(today.succ_opt().unwrap(), today));
        assert!(!is_future(today, today));
        assert!(!is_future(today.pred_opt().unwrap(), today));
    }

    #[test]
    fn test_today_key_matches_today() {
        assert_eq!(today_key(), key_for(today()));
    }
}
