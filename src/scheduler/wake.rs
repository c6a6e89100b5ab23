use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveTime, TimeDelta, TimeZone, Weekday};

use crate::utils::time::{at_time, hours_to_seconds};

use super::state::SchedulerState;

/// Polling for the next workday starts at this local time, plus an offset.
pub fn wake_up_time() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 15, 0).unwrap_or(NaiveTime::MIN)
}

/// Workday after `today`. Friday skips the weekend, there is no holiday calendar.
pub fn next_workday(today: Weekday) -> u64 {
    match today {
        Weekday::Fri => 3,
        _ => 1,
    }
}

/// When to resume polling once today's split goal was met: the next workday at 07:15 on the wall
/// clock of `zone`, pushed forward by the average daily goal converted from hours to seconds.
///
/// The wall clock time is resolved on the wake up day itself, so a daylight saving switch in
/// between doesn't move it.
pub fn next_wake_up<Tz: TimeZone>(
    state: &SchedulerState,
    zone: &Tz,
) -> Option<DateTime<FixedOffset>> {
    let today = state.now.with_timezone(zone);
    let date = today
        .date_naive()
        .checked_add_days(Days::new(next_workday(today.weekday())))?;
    let base = at_time(&today, date, wake_up_time())?;
    let offset = TimeDelta::try_seconds(hours_to_seconds(state.progress.average_daily_goal()))?;
    base.checked_add_signed(offset).map(|v| v.fixed_offset())
}
