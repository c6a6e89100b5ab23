use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use now::DateTimeNow;

/// This is the standard way of converting a date to a string in query parameters.
pub fn date_to_query(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns the most recent Monday at or before `date`, truncated to midnight.
pub fn week_start<Tz: TimeZone>(date: &DateTime<Tz>) -> DateTime<Tz> {
    date.beginning_of_week()
}

/// Converts fractional hours to a whole number of seconds, truncating the remainder.
pub fn hours_to_seconds(hours: f64) -> i64 {
    (hours * 60. * 60.) as i64
}

/// `time` on `date`, in the timezone of `reference`. Ambiguous local times resolve to the earlier
/// instant.
pub fn at_time<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    date: NaiveDate,
    time: NaiveTime,
) -> Option<DateTime<Tz>> {
    reference
        .timezone()
        .from_local_datetime(&date.and_time(time))
        .earliest()
}
