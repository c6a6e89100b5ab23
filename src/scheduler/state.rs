use chrono::{DateTime, FixedOffset};

use super::goal::{Accumulation, DayProgress, GoalSpec, PeriodWindow};

/// Snapshot of one scheduler iteration. Each step produces a new value rather than mutating the
/// previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerState {
    /// Instant the iteration started at. Today's goal and the next wake up derive from it.
    pub now: DateTime<FixedOffset>,
    pub window: PeriodWindow,
    pub progress: DayProgress,
    pub accumulation: Accumulation,
}

impl SchedulerState {
    pub fn start(goal: &GoalSpec, now: DateTime<FixedOffset>) -> Self {
        let window = PeriodWindow::containing(&now);
        Self {
            now,
            window,
            progress: goal.day_progress(&window, &now),
            accumulation: Accumulation::default(),
        }
    }

    /// State for a new iteration starting at `now`. The window only changes once `now` reaches a
    /// new week.
    pub fn at(self, goal: &GoalSpec, now: DateTime<FixedOffset>) -> Self {
        let window = self.window.roll(&now);
        Self {
            now,
            window,
            progress: goal.day_progress(&window, &now),
            accumulation: self.accumulation,
        }
    }

    pub fn observe(self, accumulation: Accumulation) -> Self {
        Self {
            accumulation,
            ..self
        }
    }

    pub fn total(&self) -> f64 {
        self.accumulation.total()
    }

    pub fn is_satisfied(&self, goal: &GoalSpec) -> bool {
        goal.is_satisfied(&self.progress, self.total())
    }
}
