use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::CoreError;

/// Bar granularity, in the Yahoo Finance chart vocabulary.
///
/// The same value drives both the upstream fetch and the RSI candle buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minute1,
    Minute2,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Minute90,
    Hour1,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Interval {
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute2,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Minute30,
            Interval::Minute60,
            Interval::Minute90,
            Interval::Hour1,
            Interval::Day1,
            Interval::Day5,
            Interval::Week1,
            Interval::Month1,
            Interval::Month3,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute2 => "2m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Minute60 => "60m",
            Interval::Minute90 => "90m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Day5 => "5d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
            Interval::Month3 => "3mo",
        }
    }

    /// Fixed bucket width in minutes. `None` for calendar-aligned intervals.
    fn fixed_minutes(&self) -> Option<i64> {
        match self {
            Interval::Minute1 => Some(1),
            Interval::Minute2 => Some(2),
            Interval::Minute5 => Some(5),
            Interval::Minute15 => Some(15),
            Interval::Minute30 => Some(30),
            Interval::Minute60 | Interval::Hour1 => Some(60),
            Interval::Minute90 => Some(90),
            Interval::Day1 => Some(24 * 60),
            Interval::Day5 => Some(5 * 24 * 60),
            Interval::Week1 | Interval::Month1 | Interval::Month3 => None,
        }
    }

    /// Longest history window the upstream serves for this granularity.
    pub fn default_range(&self) -> &'static str {
        match self {
            Interval::Minute1 => "7d",
            Interval::Minute2
            | Interval::Minute5
            | Interval::Minute15
            | Interval::Minute30
            | Interval::Minute90 => "60d",
            _ => "2y",
        }
    }

    /// Floor a timestamp to the start of its bucket on the `tz` wall clock.
    ///
    /// Fixed-width intervals are aligned to multiples of their width since
    /// local 1970-01-01 00:00, so every width that divides a day starts at
    /// local midnight. Weeks start on Monday, quarters in Jan/Apr/Jul/Oct.
    pub fn floor(&self, timestamp: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let local = timestamp.with_timezone(&tz).naive_local();

        let floored = match self.fixed_minutes() {
            Some(minutes) => {
                let step = minutes * 60;
                let secs = local.and_utc().timestamp().div_euclid(step) * step;
                match DateTime::from_timestamp(secs, 0) {
                    Some(dt) => dt.naive_utc(),
                    None => return timestamp,
                }
            }
            None => {
                let date = local.date();
                let start = match self {
                    Interval::Week1 => {
                        date - Duration::days(date.weekday().num_days_from_monday() as i64)
                    }
                    Interval::Month1 => first_of_month(date.year(), date.month()),
                    _ => first_of_month(date.year(), (date.month() - 1) / 3 * 3 + 1),
                };
                start.and_hms_opt(0, 0, 0).unwrap_or(local)
            }
        };

        resolve_local(floored, tz)
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Map a local wall-clock time back to UTC. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward to the first valid hour.
fn resolve_local(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    for shift in 0..=3 {
        let candidate = local + Duration::hours(shift);
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return dt.with_timezone(&Utc);
        }
    }
    local.and_utc()
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::all()
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedInterval(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parse_round_trips_every_interval() {
        for interval in Interval::all() {
            let parsed: Interval = interval.to_string().parse().unwrap();
            assert_eq!(parsed, *interval);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "7h".parse::<Interval>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedInterval(ref s) if s == "7h"));
        assert!("".parse::<Interval>().is_err());
    }

    #[test]
    fn floor_daily_utc() {
        let ts = utc(2025, 1, 15, 14, 35);
        assert_eq!(Interval::Day1.floor(ts, Tz::UTC), utc(2025, 1, 15, 0, 0));
    }

    #[test]
    fn floor_daily_uses_exchange_midnight() {
        // 2025-01-15 02:00 UTC is 21:00 on Jan 14 in New York (EST)
        let ts = utc(2025, 1, 15, 2, 0);
        let floored = Interval::Day1.floor(ts, Tz::America__New_York);
        assert_eq!(floored, utc(2025, 1, 14, 5, 0));
    }

    #[test]
    fn floor_daily_edt_offset() {
        // July: New York is UTC-4, so local midnight is 04:00 UTC
        let ts = utc(2025, 7, 15, 15, 0);
        let floored = Interval::Day1.floor(ts, Tz::America__New_York);
        assert_eq!(floored, utc(2025, 7, 15, 4, 0));
    }

    #[test]
    fn floor_intraday_steps() {
        let ts = utc(2025, 1, 15, 14, 37);
        assert_eq!(Interval::Minute1.floor(ts, Tz::UTC), ts);
        assert_eq!(Interval::Minute5.floor(ts, Tz::UTC), utc(2025, 1, 15, 14, 35));
        assert_eq!(Interval::Minute15.floor(ts, Tz::UTC), utc(2025, 1, 15, 14, 30));
        assert_eq!(Interval::Hour1.floor(ts, Tz::UTC), utc(2025, 1, 15, 14, 0));
        assert_eq!(Interval::Minute60.floor(ts, Tz::UTC), utc(2025, 1, 15, 14, 0));
    }

    #[test]
    fn floor_ninety_minutes_is_epoch_aligned() {
        // 14:37 is 877 minutes into the day; 1440 minutes per day is 16 * 90,
        // so buckets restart at midnight and 14:37 falls in [13:30, 15:00)
        let ts = utc(2025, 1, 15, 14, 37);
        assert_eq!(Interval::Minute90.floor(ts, Tz::UTC), utc(2025, 1, 15, 13, 30));
    }

    #[test]
    fn floor_weekly_to_monday() {
        // Thursday Jan 16 2025
        let ts = utc(2025, 1, 16, 18, 0);
        assert_eq!(Interval::Week1.floor(ts, Tz::UTC), utc(2025, 1, 13, 0, 0));
        // Monday itself stays put
        let monday = utc(2025, 1, 13, 9, 0);
        assert_eq!(Interval::Week1.floor(monday, Tz::UTC), utc(2025, 1, 13, 0, 0));
    }

    #[test]
    fn floor_monthly_and_quarterly() {
        let ts = utc(2025, 5, 20, 12, 0);
        assert_eq!(Interval::Month1.floor(ts, Tz::UTC), utc(2025, 5, 1, 0, 0));
        assert_eq!(Interval::Month3.floor(ts, Tz::UTC), utc(2025, 4, 1, 0, 0));
        let dec = utc(2025, 12, 31, 23, 0);
        assert_eq!(Interval::Month3.floor(dec, Tz::UTC), utc(2025, 10, 1, 0, 0));
    }

    #[test]
    fn floor_five_days_groups_epoch_multiples() {
        // 1970-01-01 is day 0; 2025-01-15 is day 20103, floored to day 20100 (Jan 12)
        let ts = utc(2025, 1, 15, 12, 0);
        assert_eq!(Interval::Day5.floor(ts, Tz::UTC), utc(2025, 1, 12, 0, 0));
    }

    #[test]
    fn floor_is_idempotent() {
        let ts = utc(2025, 3, 9, 15, 42);
        for interval in Interval::all() {
            let once = interval.floor(ts, Tz::America__New_York);
            assert_eq!(interval.floor(once, Tz::America__New_York), once, "{interval}");
            assert!(once <= ts, "{interval}");
        }
    }

    #[test]
    fn default_range_by_granularity() {
        assert_eq!(Interval::Minute1.default_range(), "7d");
        assert_eq!(Interval::Minute15.default_range(), "60d");
        assert_eq!(Interval::Hour1.default_range(), "2y");
        assert_eq!(Interval::Day1.default_range(), "2y");
        assert_eq!(Interval::Month3.default_range(), "2y");
    }

    #[test]
    fn skipped_midnight_moves_to_first_valid_hour() {
        // Chile springs forward at 00:00 on 2024-09-08; the day starts at 01:00 -03
        let santiago = Tz::America__Santiago;
        let ts = utc(2024, 9, 8, 15, 0);
        let day_start = utc(2024, 9, 8, 4, 0);

        assert_eq!(Interval::Day1.floor(ts, santiago), day_start);
        assert_eq!(Interval::Day1.floor(day_start, santiago), day_start);
        // 2024-09-08 is a Sunday, so the week started on Sep 2 before the change
        assert_eq!(Interval::Week1.floor(ts, santiago), utc(2024, 9, 2, 4, 0));
    }

    #[test]
    fn repeated_midnight_takes_earlier_instant() {
        // Cuba falls back at 01:00 CDT on 2024-11-03, so 00:00 occurs twice
        let havana = Tz::America__Havana;
        let first_midnight = utc(2024, 11, 3, 4, 0);

        // 00:30 CST, the second pass through the repeated hour
        let ts = utc(2024, 11, 3, 5, 30);
        assert_eq!(Interval::Day1.floor(ts, havana), first_midnight);
        assert_eq!(Interval::Day1.floor(first_midnight, havana), first_midnight);

        // noon CST later that day lands in the same bucket
        let noon = utc(2024, 11, 3, 17, 0);
        assert_eq!(Interval::Day1.floor(noon, havana), first_midnight);
    }
}
