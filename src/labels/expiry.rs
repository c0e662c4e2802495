//! Expiry date arithmetic and freshness classification.
//!
//! All arithmetic is in calendar days. Elapsed time never enters into it, so
//! daylight-saving shifts cannot move a label across a day boundary.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::Serialize;

use super::error::{LabelError, Result};
use super::record::LabelRecord;

/// Labels within this many days of expiry are flagged
pub const EXPIRING_SOON_DAYS: i64 = 2;

/// Accepted input formats for production dates
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Fresh,
}

/// Production date plus shelf life, in whole calendar days
pub fn compute_expiry(production_date: NaiveDate, shelf_life_days: u32) -> Result<NaiveDate> {
    production_date
        .checked_add_days(Days::new(u64::from(shelf_life_days)))
        .ok_or_else(|| {
            LabelError::InvalidInput(format!(
                "{} + {} days is out of range",
                production_date, shelf_life_days
            ))
        })
}

/// Parse `YYYY-MM-DD` or `dd.mm.yyyy`
pub fn parse_production_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| LabelError::InvalidInput(format!("cannot parse date '{}'", input)))
}

/// Calendar days from `today` until `expiry` (negative once past)
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

/// Classify a date against today: expiry day itself counts as expired
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    match days_until_expiry(expiry, today) {
        d if d <= 0 => ExpiryStatus::Expired,
        d if d <= EXPIRING_SOON_DAYS => ExpiryStatus::ExpiringSoon,
        _ => ExpiryStatus::Fresh,
    }
}

pub fn expiry_status<Tz: TimeZone>(record: &LabelRecord, now: &DateTime<Tz>) -> ExpiryStatus {
    classify(record.expiry_date, now.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::catalog::CategoryRule;
    use chrono::{Local, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_days_is_same_date() {
        assert_eq!(compute_expiry(date(2024, 1, 1), 0).unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn test_month_and_year_rollover() {
        assert_eq!(compute_expiry(date(2024, 1, 30), 3).unwrap(), date(2024, 2, 2));
        assert_eq!(compute_expiry(date(2024, 2, 27), 3).unwrap(), date(2024, 3, 1), "2024 is a leap year");
        assert_eq!(compute_expiry(date(2023, 2, 27), 3).unwrap(), date(2023, 3, 2));
        assert_eq!(compute_expiry(date(2023, 12, 30), 10).unwrap(), date(2024, 1, 9));
    }

    #[test]
    fn test_across_dst_change() {
        // Last Sunday of March: clocks move in most of Europe
        assert_eq!(compute_expiry(date(2024, 3, 30), 2).unwrap(), date(2024, 4, 1));
    }

    #[test]
    fn test_overflow_is_invalid_input() {
        let err = compute_expiry(NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, LabelError::InvalidInput(_)));
    }

    #[test]
    fn test_monotonic_and_additive() {
        let start = date(2024, 1, 28);
        let mut previous = start;
        for days in 0..40u32 {
            let expiry = compute_expiry(start, days).unwrap();
            assert!(expiry >= previous, "Expiry must not go backwards at {} days", days);
            previous = expiry;
        }

        for (a, b) in [(0, 0), (1, 2), (3, 7), (10, 31), (29, 365)] {
            let direct = compute_expiry(start, a + b).unwrap();
            let stepped = compute_expiry(compute_expiry(start, a).unwrap(), b).unwrap();
            assert_eq!(direct, stepped, "a={} b={}", a, b);
        }
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_production_date("2024-01-01").unwrap(), date(2024, 1, 1));
        assert_eq!(parse_production_date(" 15.03.2024 ").unwrap(), date(2024, 3, 15));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "tomorrow", "2024-13-01", "31.02.2024", "2024/01/01"] {
            let err = parse_production_date(input).unwrap_err();
            assert!(matches!(err, LabelError::InvalidInput(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_classify_around_today() {
        let today = date(2024, 1, 10);
        assert_eq!(classify(date(2024, 1, 9), today), ExpiryStatus::Expired);
        assert_eq!(classify(date(2024, 1, 10), today), ExpiryStatus::Expired);
        assert_eq!(classify(date(2024, 1, 11), today), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify(date(2024, 1, 12), today), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify(date(2024, 1, 13), today), ExpiryStatus::Fresh);
        assert_eq!(classify(date(2024, 1, 20), today), ExpiryStatus::Fresh);
    }

    #[test]
    fn test_expiry_status_uses_local_date_of_now() {
        let rule = CategoryRule::new("Мясо", 3, "0-4°C");
        let record = LabelRecord::new(
            "Chicken".to_string(),
            &rule,
            date(2024, 1, 8),
            date(2024, 1, 11),
            Local::now(),
        );

        // Late in the day still counts as the 10th
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap();
        assert_eq!(expiry_status(&record, &now), ExpiryStatus::ExpiringSoon);

        let now = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(expiry_status(&record, &now), ExpiryStatus::Expired);
    }

    #[test]
    fn test_days_until_expiry() {
        assert_eq!(days_until_expiry(date(2024, 1, 12), date(2024, 1, 10)), 2);
        assert_eq!(days_until_expiry(date(2024, 1, 8), date(2024, 1, 10)), -2);
    }
}
