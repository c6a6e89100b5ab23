//! Goal arithmetic. Everything here is a pure function of the goal, the week window and an
//! instant, which keeps the scheduler loop itself thin.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::utils::time::week_start;

/// Goals are split across a Monday to Friday week.
pub const WORKDAYS_PER_WEEK: f64 = 5.;

/// Lower bound for fine polling, a zero timeout would otherwise hammer the backend.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSpec {
    /// Hours for the whole week when `split`, otherwise for this single check.
    pub target_hours: f64,
    /// Margin subtracted from the goal, also used as the fine polling interval.
    pub timeout_hours: f64,
    pub split: bool,
}

/// The reporting week a goal accumulates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub week_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProgress {
    /// Workdays of the week so far, today included. Within `[1, 5]`.
    pub counting_days: f64,
    pub day_goal: f64,
}

/// Hours tracked so far. `live` is the running entry projected to the moment of the poll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accumulation {
    pub reported: f64,
    pub live: f64,
}

impl PeriodWindow {
    pub fn containing(now: &DateTime<FixedOffset>) -> Self {
        Self {
            week_start: week_start(now).date_naive(),
        }
    }

    /// Moves the window to the week of `now` once `now` is past this week. Never moves back.
    pub fn roll(self, now: &DateTime<FixedOffset>) -> Self {
        let current = Self::containing(now);
        if current.week_start > self.week_start {
            current
        } else {
            self
        }
    }

    pub fn counting_days(&self, now: &DateTime<FixedOffset>) -> f64 {
        let elapsed = (now.date_naive() - self.week_start).num_days() as f64;
        (elapsed + 1.).clamp(1., WORKDAYS_PER_WEEK)
    }
}

impl DayProgress {
    /// What an average workday contributes to today's goal.
    pub fn average_daily_goal(&self) -> f64 {
        self.day_goal / self.counting_days
    }
}

impl Accumulation {
    pub fn total(&self) -> f64 {
        self.reported + self.live
    }

    pub fn is_running(&self) -> bool {
        self.live > 0.
    }
}

impl GoalSpec {
    pub fn day_progress(&self, window: &PeriodWindow, now: &DateTime<FixedOffset>) -> DayProgress {
        let counting_days = window.counting_days(now);
        let day_goal = if self.split {
            self.target_hours * counting_days / WORKDAYS_PER_WEEK
        } else {
            self.target_hours
        };
        DayProgress {
            counting_days,
            day_goal,
        }
    }

    /// The total at which polling stops.
    pub fn threshold(&self, progress: &DayProgress) -> f64 {
        progress.day_goal - self.timeout_hours
    }

    pub fn is_satisfied(&self, progress: &DayProgress, total: f64) -> bool {
        total >= self.threshold(progress)
    }

    /// Best effort sleep before fine polling takes over, in whole minutes. Zero when the goal is
    /// already within reach.
    pub fn estimated_sleep(&self, progress: &DayProgress, total: f64) -> Duration {
        let minutes = ((progress.day_goal - total - self.timeout_hours) * 60.) as i64;
        if minutes <= 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(minutes as u64 * 60)
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_hours * 60. * 60.)
            .unwrap_or(MIN_POLL_INTERVAL)
            .max(MIN_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

    use super::{Accumulation, DayProgress, GoalSpec, PeriodWindow, MIN_POLL_INTERVAL};

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        // 2024-04-01 is a Monday
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 4, day, hour, 0, 0)
            .unwrap()
    }

    fn split_goal(target_hours: f64) -> GoalSpec {
        GoalSpec {
            target_hours,
            timeout_hours: 0.25,
            split: true,
        }
    }

    #[test]
    fn test_window_starts_on_monday() {
        let window = PeriodWindow::containing(&at(4, 12));
        assert_eq!(window.week_start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn test_counting_days() {
        let window = PeriodWindow::containing(&at(1, 9));
        assert_eq!(window.counting_days(&at(1, 9)), 1.);
        assert_eq!(window.counting_days(&at(1, 23)), 1.);
        assert_eq!(window.counting_days(&at(3, 0)), 3.);
        assert_eq!(window.counting_days(&at(5, 18)), 5.);
        // Weekend days don't add to the goal
        assert_eq!(window.counting_days(&at(6, 10)), 5.);
        assert_eq!(window.counting_days(&at(7, 10)), 5.);
    }

    #[test]
    fn test_window_rolls_forward_only() {
        let window = PeriodWindow::containing(&at(5, 9));
        assert_eq!(window.roll(&at(7, 9)), window);
        let next = window.roll(&at(8, 9));
        assert_eq!(next.week_start, NaiveDate::from_ymd_opt(2024, 4, 8).unwrap());
        assert_eq!(next.roll(&at(5, 9)), next);
    }

    #[test]
    fn test_split_day_goal_is_monotonic() {
        let goal = split_goal(40.);
        let window = PeriodWindow::containing(&at(1, 9));
        let goals = (1..=7)
            .map(|day| goal.day_progress(&window, &at(day, 10)).day_goal)
            .collect::<Vec<_>>();
        assert!(goals.windows(2).all(|w| w[0] <= w[1]), "{goals:?}");
        assert_eq!(goals[0], 8.);
        assert_eq!(goals[4], 40.);
    }

    #[test]
    fn test_unsplit_goal_is_flat() {
        let goal = GoalSpec {
            target_hours: 6.,
            timeout_hours: 0.1,
            split: false,
        };
        let window = PeriodWindow::containing(&at(1, 9));
        assert_eq!(goal.day_progress(&window, &at(3, 9)).day_goal, 6.);
    }

    #[test]
    fn test_day_progress_is_idempotent() {
        let goal = split_goal(25.);
        let now = at(3, 14);
        let window = PeriodWindow::containing(&now);
        assert_eq!(
            goal.day_progress(&window, &now),
            goal.day_progress(&window, &now)
        );
    }

    #[test]
    fn test_satisfied_on_boundary() {
        let goal = split_goal(25.);
        let progress = DayProgress {
            counting_days: 1.,
            day_goal: 5.,
        };
        assert!(!goal.is_satisfied(&progress, 4.5));
        assert!(goal.is_satisfied(&progress, 4.75));
        assert!(goal.is_satisfied(&progress, 4.9));
    }

    #[test]
    fn test_estimated_sleep() {
        let goal = split_goal(25.);
        let progress = DayProgress {
            counting_days: 1.,
            day_goal: 5.,
        };
        assert_eq!(
            goal.estimated_sleep(&progress, 0.),
            Duration::from_secs(285 * 60)
        );
        assert_eq!(
            goal.estimated_sleep(&progress, 4.5),
            Duration::from_secs(15 * 60)
        );
        // Partial minutes are dropped
        assert_eq!(goal.estimated_sleep(&progress, 4.74), Duration::ZERO);
        assert_eq!(goal.estimated_sleep(&progress, 4.75), Duration::ZERO);
        assert_eq!(goal.estimated_sleep(&progress, 7.), Duration::ZERO);
    }

    #[test]
    fn test_poll_interval() {
        assert_eq!(split_goal(1.).poll_interval(), Duration::from_secs(15 * 60));
        let goal = GoalSpec {
            target_hours: 1.,
            timeout_hours: 0.,
            split: false,
        };
        assert_eq!(goal.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_accumulation_total() {
        let accumulation = Accumulation {
            reported: 3.,
            live: 0.5,
        };
        assert_eq!(accumulation.total(), 3.5);
        assert!(accumulation.is_running());
        assert!(!Accumulation::default().is_running());
    }
}
