//! The goal scheduler. One sequential loop that polls Toggl, sleeps for a best effort estimate
//! while the goal is far away, then polls at a fixed interval until the goal is in reach,
//! notifies, and for split goals waits for the next workday.

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use goal::{Accumulation, GoalSpec};
use state::SchedulerState;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wake::next_wake_up;

use crate::{
    notify::Notifier,
    toggl::{ActiveEntries, TimeReporting, TogglError, WorkspaceSelector},
    utils::clock::Clock,
};

pub mod goal;
pub mod state;
pub mod wake;

pub const NOTIFICATION_TITLE: &str = "Goal reached";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// An unsplit goal was reached and notified.
    GoalReached,
    /// Shutdown was requested while waiting.
    Cancelled,
}

/// Runs the goal loop. Workday wake ups are resolved on the wall clock of `Tz`, [Local] unless
/// [GoalScheduler::in_zone] says otherwise.
pub struct GoalScheduler<Tz: TimeZone = Local> {
    goal: GoalSpec,
    selector: WorkspaceSelector,
    reporting: Arc<dyn TimeReporting>,
    entries: Arc<dyn ActiveEntries>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    shutdown: CancellationToken,
    zone: Tz,
}

impl GoalScheduler {
    pub fn new(
        goal: GoalSpec,
        selector: WorkspaceSelector,
        reporting: Arc<dyn TimeReporting>,
        entries: Arc<dyn ActiveEntries>,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            goal,
            selector,
            reporting,
            entries,
            notifier,
            clock,
            shutdown,
            zone: Local,
        }
    }
}

impl<Tz: TimeZone> GoalScheduler<Tz> {
    pub fn in_zone<Z: TimeZone>(self, zone: Z) -> GoalScheduler<Z> {
        GoalScheduler {
            goal: self.goal,
            selector: self.selector,
            reporting: self.reporting,
            entries: self.entries,
            notifier: self.notifier,
            clock: self.clock,
            shutdown: self.shutdown,
            zone,
        }
    }

    /// Executes the scheduler loop. Returns once an unsplit goal is reached or shutdown is
    /// requested. Rejected credentials and failed notifications end the run with an error.
    pub async fn run(self) -> Result<RunOutcome> {
        let mut state = SchedulerState::start(&self.goal, self.clock.time());
        loop {
            state = state.at(&self.goal, self.clock.time());

            let Some(accumulation) = self.poll_until_ok(&state).await? else {
                return Ok(RunOutcome::Cancelled);
            };
            state = state.observe(accumulation);

            let estimate = self.goal.estimated_sleep(&state.progress, state.total());
            self.log_progress(estimate, &state);
            if !estimate.is_zero() && !self.sleep(estimate).await {
                return Ok(RunOutcome::Cancelled);
            }

            let Some(reached) = self.fine_poll(state).await? else {
                return Ok(RunOutcome::Cancelled);
            };
            state = reached;

            self.notify(&state).await?;

            if !self.goal.split {
                return Ok(RunOutcome::GoalReached);
            }

            let wake_up = next_wake_up(&state, &self.zone)
                .ok_or_else(|| anyhow!("Can't compute next wake up after {}", state.now))?;
            println!("Waiting until {}", wake_up.format("%a %b %-d %H:%M"));
            info!(%wake_up, "Waiting for the next workday");
            let delay = (wake_up - self.clock.time())
                .to_std()
                .unwrap_or(Duration::ZERO);
            if !self.sleep(delay).await {
                return Ok(RunOutcome::Cancelled);
            }
        }
    }

    /// Polls at the fixed interval until the goal is within the timeout margin. `None` once
    /// shutdown is requested.
    async fn fine_poll(&self, mut state: SchedulerState) -> Result<Option<SchedulerState>> {
        let interval = self.goal.poll_interval();
        while !state.is_satisfied(&self.goal) {
            self.log_progress(interval, &state);
            if !self.sleep(interval).await {
                return Ok(None);
            }
            if let Some(accumulation) = self.try_poll(&state).await? {
                state = state.observe(accumulation);
            }
        }
        Ok(Some(state))
    }

    /// Keeps polling at the fine interval until one poll succeeds. `None` once shutdown is
    /// requested.
    async fn poll_until_ok(&self, state: &SchedulerState) -> Result<Option<Accumulation>> {
        loop {
            if let Some(accumulation) = self.try_poll(state).await? {
                return Ok(Some(accumulation));
            }
            if !self.sleep(self.goal.poll_interval()).await {
                return Ok(None);
            }
        }
    }

    /// A recoverable failure is logged and reported as `None`, so the caller keeps its last known
    /// total. Anything else ends the run.
    async fn try_poll(&self, state: &SchedulerState) -> Result<Option<Accumulation>> {
        match self.poll(state).await {
            Ok(accumulation) => Ok(Some(accumulation)),
            Err(e) if e.is_recoverable() => {
                warn!(
                    error = %e,
                    retry_in = ?self.goal.poll_interval(),
                    "Poll failed, keeping previous total"
                );
                Ok(None)
            }
            Err(e) => {
                error!("Unrecoverable poll failure {e:?}");
                Err(e.into())
            }
        }
    }

    async fn poll(&self, state: &SchedulerState) -> Result<Accumulation, TogglError> {
        let live = self
            .entries
            .running_hours(&self.selector, self.clock.time())
            .await?;
        let reported = self
            .reporting
            .total_hours(&self.selector, state.window.week_start)
            .await?;
        Ok(Accumulation { reported, live })
    }

    async fn notify(&self, state: &SchedulerState) -> Result<()> {
        let body = format!(
            "{:.2}h reached with a total of {:.2}h",
            state.progress.day_goal,
            state.total()
        );
        self.notifier
            .alert(NOTIFICATION_TITLE, &body)
            .await
            .inspect_err(|e| error!("Failed to deliver notification {e:?}"))?;
        println!(
            "Done with {:.2}h by a total of {:.2}h",
            state.progress.day_goal,
            state.total()
        );
        info!(goal = state.progress.day_goal, total = state.total(), "Goal reached");
        Ok(())
    }

    /// Returns `false` when shutdown was requested before `duration` passed.
    async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested, stopping");
                false
            }
            _ = self.clock.sleep(duration) => true,
        }
    }

    fn log_progress(&self, sleep: Duration, state: &SchedulerState) {
        info!(
            ?sleep,
            goal = %format!("{:.2}h", state.progress.day_goal),
            total = %format!("{:.2}h", state.total()),
            running = state.accumulation.is_running(),
            "Sleeping"
        );
    }
}
