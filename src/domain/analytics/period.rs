//! Reporting periods and bucketing granularity

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainError;

/// Inclusive calendar-day range used by reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Missing bounds default to 1970-01-01 and `today`
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            start: start.unwrap_or_else(epoch),
            end: end.unwrap_or(today),
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// First instant of the start day
    pub fn start_instant(&self) -> DateTime<Utc> {
        start_of_day(self.start)
    }

    /// Last instant of the end day
    pub fn end_instant(&self) -> DateTime<Utc> {
        end_of_day(self.end)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.start > self.end {
            return Err(DomainError::validation(
                "start_date must be before or equal to end_date",
            ));
        }
        Ok(())
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// 23:59:59.999999999 on the given day
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or_else(|| start_of_day(day))
}

/// Bucket size for time series reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    /// ISO weeks, starting Monday
    Week,
    Month,
}

impl Granularity {
    /// First day of the bucket containing `day`
    pub fn bucket_start(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => day,
            Self::Week => {
                let offset = u64::from(day.weekday().num_days_from_monday());
                day.checked_sub_days(Days::new(offset)).unwrap_or(day)
            }
            Self::Month => day.with_day(1).unwrap_or(day),
        }
    }
}

impl FromStr for Granularity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(DomainError::validation(
                "Invalid group_by value. Use: day, week, month",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_defaults() {
        let today = day(2024, 6, 15);
        let period = Period::resolve(None, None, today);
        assert_eq!(period.start, day(1970, 1, 1));
        assert_eq!(period.end, today);
    }

    #[test]
    fn test_end_instant_covers_whole_day() {
        let period = Period::single_day(day(2024, 2, 29));
        let late = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert!(period.start_instant() <= late);
        assert!(late <= period.end_instant());
        assert!(period.end_instant() < Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let period = Period {
            start: day(2024, 2, 1),
            end: day(2024, 1, 1),
        };
        assert!(period.validate().is_err());
    }

    #[test]
    fn test_week_bucket_starts_monday() {
        // 2024-03-07 is a Thursday
        assert_eq!(Granularity::Week.bucket_start(day(2024, 3, 7)), day(2024, 3, 4));
        assert_eq!(Granularity::Week.bucket_start(day(2024, 3, 4)), day(2024, 3, 4));
        assert_eq!(Granularity::Week.bucket_start(day(2024, 3, 10)), day(2024, 3, 4));
    }

    #[test]
    fn test_month_bucket() {
        assert_eq!(Granularity::Month.bucket_start(day(2024, 3, 31)), day(2024, 3, 1));
        assert_eq!(Granularity::Day.bucket_start(day(2024, 3, 31)), day(2024, 3, 31));
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("WEEK".parse::<Granularity>().unwrap(), Granularity::Week);
        let err = "year".parse::<Granularity>().unwrap_err();
        assert_eq!(err.message(), "Invalid group_by value. Use: day, week, month");
    }
}
