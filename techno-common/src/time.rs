//! Date utilities

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, TimeZone};

const DEFAULT_YEAR: i32 = 2020;
const DEFAULT_MONTH: i64 = 1;
const DEFAULT_DAY: i64 = 1;

/// Parse `YYYY/MM/DD` as midnight in `tz`
///
/// A missing or unparseable component falls back to 2020, January or the
/// 1st. Out-of-range months and days roll over into the neighbouring
/// period: month 13 is January of the next year, February 30th is March
/// 2nd (or 1st in a leap year), day 0 is the last day of the previous
/// month. A date outside the supported calendar range yields 2020-01-01.
///
/// # Examples
///
/// ```
/// use chrono::{Datelike, Utc};
/// use techno_common::time::convert_to_date;
///
/// let date = convert_to_date("2023/07/14", &Utc);
/// assert_eq!((date.year(), date.month(), date.day()), (2023, 7, 14));
///
/// let fallback = convert_to_date("x/7/14", &Utc);
/// assert_eq!(fallback.year(), 2020);
///
/// let rolled = convert_to_date("2022/13/10", &Utc);
/// assert_eq!((rolled.year(), rolled.month(), rolled.day()), (2023, 1, 10));
/// ```
pub fn convert_to_date<Tz: TimeZone>(date: &str, tz: &Tz) -> DateTime<Tz> {
    let mut parts = date.split('/');

    let year = parts
        .next()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(DEFAULT_YEAR);
    let month = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_MONTH);
    let day = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_DAY);

    let naive = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|start| shift_months(start, month - 1))
        .and_then(|first| shift_days(first, day - 1))
        .or_else(|| NaiveDate::from_ymd_opt(DEFAULT_YEAR, 1, 1))
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN);

    // Midnight can fall in a DST gap; take the UTC reading then
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let step = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    }
}
